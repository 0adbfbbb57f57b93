//! Attested claims CLI: the `claims` command.
//!
//! Manages local identities, builds signed requests for attestation and
//! derives selective-disclosure presentations from attested claims.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde_json::Value;

use attested_claims::crypto::random::random_bytes;
use attested_claims::storage::{load_identity, read_public_identity, save_identity};
use attested_claims::{
    AttestedClaim, CType, Claim, ClientConfig, Compress, Identity, RequestBuilder,
    RequestForAttestation,
};

const PASSPHRASE_ENV: &str = "CLAIMS_PASSPHRASE";

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "claims",
    version,
    about = "Attested claims: identities, requests for attestation and presentations"
)]
struct Cli {
    /// Identity to act as (keystore file name without extension)
    #[arg(long, global = true, default_value = "default")]
    identity: String,

    /// Configuration file (defaults to ~/.attested-claims/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print additional detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage local identities
    Identity {
        #[command(subcommand)]
        subcommand: IdentityCommands,
    },
    /// Work with claim types
    Ctype {
        #[command(subcommand)]
        subcommand: CtypeCommands,
    },
    /// Build and check requests for attestation
    Request {
        #[command(subcommand)]
        subcommand: RequestCommands,
    },
    /// Derive presentations from attested claims
    Presentation {
        #[command(subcommand)]
        subcommand: PresentationCommands,
    },
    /// Check attested claims
    Credential {
        #[command(subcommand)]
        subcommand: CredentialCommands,
    },
}

#[derive(Subcommand)]
enum IdentityCommands {
    /// Create a new identity and store it encrypted in the keystore
    New {
        /// Human-readable label stored alongside the key
        #[arg(long)]
        name: Option<String>,
    },
    /// Show the public half of an identity
    Show,
}

#[derive(Subcommand)]
enum CtypeCommands {
    /// Print the hash of a CType schema
    Hash {
        /// Path to the schema JSON
        schema: PathBuf,
    },
}

#[derive(Subcommand)]
enum RequestCommands {
    /// Build and sign a request for attestation as the current identity
    Build {
        /// Path to the CType schema JSON
        #[arg(long)]
        ctype: PathBuf,
        /// Claim contents as a JSON object
        #[arg(long)]
        contents: String,
        /// Write the request here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Emit the compressed tuple form
        #[arg(long)]
        compress: bool,
    },
    /// Check the integrity and signature of a request
    Verify {
        /// Path to the request JSON (object or compressed form)
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum PresentationCommands {
    /// Hide attributes of an attested claim
    Create {
        /// Path to the attested claim JSON (object or compressed form)
        credential: PathBuf,
        /// Comma-separated attribute names to hide
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,
        /// Also hide the claim owner
        #[arg(long)]
        exclude_owner: bool,
        /// Write the presentation here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Emit the compressed tuple form
        #[arg(long)]
        compress: bool,
    },
}

#[derive(Subcommand)]
enum CredentialCommands {
    /// Check an attested claim's data without contacting a ledger
    VerifyData {
        /// Path to the attested claim JSON (object or compressed form)
        file: PathBuf,
    },
}

// ── Paths and configuration ───────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(ClientConfig::default_path);
    ClientConfig::load(&path).with_context(|| format!("failed to load config {}", path.display()))
}

fn keystore_path(config: &ClientConfig, name: &str) -> PathBuf {
    config.keystore_dir.join(format!("{name}.json"))
}

// ── Passphrase helper ─────────────────────────────────────────────────────────

fn read_passphrase(prompt: &str) -> Result<String> {
    if let Ok(passphrase) = std::env::var(PASSPHRASE_ENV) {
        return Ok(passphrase);
    }
    eprint!("{prompt}");
    let mut passphrase = String::new();
    std::io::stdin()
        .read_line(&mut passphrase)
        .context("failed to read passphrase")?;
    Ok(passphrase.trim().to_string())
}

fn unlock(config: &ClientConfig, name: &str) -> Result<Identity> {
    let path = keystore_path(config, name);
    if !path.exists() {
        return Err(anyhow!(
            "identity '{}' not found (expected at {})",
            name,
            path.display()
        ));
    }
    let passphrase = read_passphrase("Passphrase: ")?;
    load_identity(&path, &passphrase).with_context(|| format!("failed to unlock '{name}'"))
}

// ── File helpers ──────────────────────────────────────────────────────────────

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Accepts both the object form and the compressed tuple form.
fn read_entity<T: DeserializeOwned + Compress>(path: &Path) -> Result<T> {
    let value = read_json(path)?;
    if value.is_array() {
        T::decompress(&value).with_context(|| format!("malformed compressed {}", T::ENTITY))
    } else {
        serde_json::from_value(value).with_context(|| format!("malformed {}", T::ENTITY))
    }
}

fn emit<T: serde::Serialize + Compress>(
    entity: &T,
    compress: bool,
    output: Option<&Path>,
) -> Result<()> {
    let json = if compress {
        serde_json::to_string(&entity.compress())?
    } else {
        serde_json::to_string_pretty(entity)?
    };
    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write to {}", path.display()))?;
            eprintln!("Wrote {} to {}", T::ENTITY, path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn verdict(valid: bool) -> &'static str {
    if valid {
        "VALID"
    } else {
        "INVALID"
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let verbose = cli.verbose;
    let identity_name = cli.identity.clone();
    let config_path = cli.config.clone();

    let result = match cli.command {
        Commands::Identity { subcommand } => match subcommand {
            IdentityCommands::New { name } => {
                cmd_identity_new(config_path.as_deref(), &identity_name, name, verbose)
            }
            IdentityCommands::Show => cmd_identity_show(config_path.as_deref(), &identity_name),
        },
        Commands::Ctype { subcommand } => match subcommand {
            CtypeCommands::Hash { schema } => cmd_ctype_hash(&schema, verbose),
        },
        Commands::Request { subcommand } => match subcommand {
            RequestCommands::Build {
                ctype,
                contents,
                output,
                compress,
            } => cmd_request_build(
                config_path.as_deref(),
                &identity_name,
                &ctype,
                &contents,
                output.as_deref(),
                compress,
            ),
            RequestCommands::Verify { file } => cmd_request_verify(&file, verbose),
        },
        Commands::Presentation { subcommand } => match subcommand {
            PresentationCommands::Create {
                credential,
                exclude,
                exclude_owner,
                output,
                compress,
            } => cmd_presentation_create(
                &credential,
                &exclude,
                exclude_owner,
                output.as_deref(),
                compress,
            ),
        },
        Commands::Credential { subcommand } => match subcommand {
            CredentialCommands::VerifyData { file } => cmd_credential_verify_data(&file, verbose),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

// ── Command implementations ───────────────────────────────────────────────────

/// `claims identity new [--name LABEL]`
fn cmd_identity_new(
    config_path: Option<&Path>,
    file_name: &str,
    label: Option<String>,
    verbose: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let path = keystore_path(&config, file_name);
    if path.exists() {
        return Err(anyhow!(
            "identity '{}' already exists at {}",
            file_name,
            path.display()
        ));
    }

    let passphrase = read_passphrase("Passphrase: ")?;
    if std::env::var(PASSPHRASE_ENV).is_err() {
        let confirm = read_passphrase("Confirm passphrase: ")?;
        if confirm != passphrase {
            return Err(anyhow!("passphrases do not match"));
        }
    }
    if passphrase.is_empty() {
        return Err(anyhow!("passphrase must not be empty"));
    }

    let identity = Identity::from_seed_with_prefix(random_bytes::<32>(), config.address_prefix)
        .context("failed to derive identity")?;
    std::fs::create_dir_all(&config.keystore_dir).with_context(|| {
        format!(
            "failed to create keystore dir {}",
            config.keystore_dir.display()
        )
    })?;
    save_identity(&identity, label.as_deref(), &path, &passphrase)
        .context("failed to write keystore file")?;

    println!("Created identity '{file_name}'");
    println!("  Address: {}", identity.address());
    if verbose {
        println!("  Box key: {}", identity.public_identity().box_public_key);
        println!("  File:    {}", path.display());
    }
    Ok(())
}

/// `claims identity show`
fn cmd_identity_show(config_path: Option<&Path>, file_name: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let path = keystore_path(&config, file_name);
    if !path.exists() {
        return Err(anyhow!(
            "identity '{}' not found (expected at {})",
            file_name,
            path.display()
        ));
    }
    let public = read_public_identity(&path).context("failed to read keystore file")?;
    println!("{}", serde_json::to_string_pretty(&public)?);
    Ok(())
}

/// `claims ctype hash <SCHEMA>`
fn cmd_ctype_hash(schema: &Path, verbose: bool) -> Result<()> {
    let ctype =
        CType::from_schema_value(read_json(schema)?, None).context("invalid CType schema")?;
    println!("{}", ctype.hash);
    if verbose {
        println!("  Title:      {}", ctype.schema.title);
        println!("  Properties: {}", ctype.schema.properties.len());
    }
    Ok(())
}

/// `claims request build --ctype <SCHEMA> --contents <JSON>`
fn cmd_request_build(
    config_path: Option<&Path>,
    identity_name: &str,
    ctype: &Path,
    contents: &str,
    output: Option<&Path>,
    compress: bool,
) -> Result<()> {
    let ctype =
        CType::from_schema_value(read_json(ctype)?, None).context("invalid CType schema")?;
    let contents: Value =
        serde_json::from_str(contents).context("claim contents are not valid JSON")?;

    let config = load_config(config_path)?;
    let identity = unlock(&config, identity_name)?;

    let claim = Claim::from_value(&ctype, contents, identity.address())
        .context("claim does not match the CType")?;
    let request = RequestBuilder::new(claim)
        .sign(&identity)
        .context("failed to sign request")?;
    log::info!("built request {}", request.root_hash);

    emit(&request, compress, output)
}

/// `claims request verify <FILE>`
fn cmd_request_verify(file: &Path, verbose: bool) -> Result<()> {
    let request: RequestForAttestation = read_entity(file)?;
    let valid = request.verify_data().context("verification failed")?;

    println!("Request: {}", request.root_hash);
    if verbose {
        println!("  CType:     {}", request.claim.ctype_hash);
        match &request.claim.owner {
            Some(owner) => println!("  Owner:     {owner}"),
            None => println!("  Owner:     (hidden)"),
        }
        let disclosed: Vec<&str> = request.disclosed_attributes().collect();
        println!("  Disclosed: {}", disclosed.join(", "));
        println!("  Signature: {}", verdict(request.verify_signature()));
    }
    println!("Result: {}", verdict(valid));

    if valid {
        Ok(())
    } else {
        Err(anyhow!("request failed verification"))
    }
}

/// `claims presentation create <CREDENTIAL> --exclude a,b [--exclude-owner]`
fn cmd_presentation_create(
    credential: &Path,
    exclude: &[String],
    exclude_owner: bool,
    output: Option<&Path>,
    compress: bool,
) -> Result<()> {
    let credential: AttestedClaim = read_entity(credential)?;
    let presentation = credential
        .create_presentation(exclude, exclude_owner)
        .context("failed to create presentation")?;
    emit(&presentation, compress, output)
}

/// `claims credential verify-data <FILE>`
fn cmd_credential_verify_data(file: &Path, verbose: bool) -> Result<()> {
    let credential: AttestedClaim = read_entity(file)?;
    let valid = credential.verify_data().context("verification failed")?;

    println!("Credential: {}", credential.request.root_hash);
    if verbose {
        println!("  Attester: {}", credential.attester());
        println!("  Revoked:  {}", credential.attestation.revoked);
        if let Some(delegation) = &credential.attestation.delegation_id {
            println!("  Delegation: {delegation}");
        }
    }
    println!("Result: {}", verdict(valid));

    if valid {
        Ok(())
    } else {
        Err(anyhow!("credential failed verification"))
    }
}
