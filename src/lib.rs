pub mod assertion;
pub mod cache;
pub mod config;
pub mod cose;
pub mod diagnostics;
pub(crate) mod encoding;
pub mod error;
pub mod photo;
pub mod store;
pub mod token;

use std::path::{Path, PathBuf};

use base64::Engine as _;

use config::{Command, Config, ContentArgs};
use error::Error;
use photo::{epoch_counter, ContentSigner, PhotoError, PhotoVerifier};
use store::{RegisteredCredential, RegistrationStore, RECORD_VERSION};
use token::{AccessTokens, TokenSecret};

pub async fn run(cfg: Config) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;
    let level = match cfg.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();

    let registry_dir = match cfg.registry_dir.clone() {
        Some(dir) => dir,
        None => default_registry_dir()?,
    };

    // Preflight checks
    diagnostics::check(&cfg, &registry_dir)?;

    let secret = TokenSecret::new(cfg.secret.clone().unwrap_or_default());
    let tokens = AccessTokens::new(secret);

    match cfg.command {
        Command::IssueToken { account } => {
            println!("{}", tokens.issue(&account)?);
        }
        Command::ResolveToken { token } => match tokens.authenticate(&token).account_id() {
            Some(account) => println!("{account}"),
            None => println!("invalid"),
        },
        Command::Import {
            credential_id,
            public_key,
            nickname,
            owner,
            disabled,
            counter,
        } => {
            let credential_id = encoding::decode_hex(&credential_id)
                .filter(|id| !id.is_empty())
                .ok_or_else(|| Error::Internal("--credential-id must be non-empty hex".into()))?;
            let key = cose::decode_cose_key(&public_key).ok_or(PhotoError::InvalidPublicKey)?;
            let record = RegisteredCredential {
                version: RECORD_VERSION,
                credential_id,
                public_key,
                rp_id: cfg.rp_id.clone(),
                enabled: !disabled,
                counter,
                nickname,
                owner,
                created_at: u64::from(epoch_counter()),
            };
            let id_hex = record.credential_id_hex();
            let mut store = open_store(&registry_dir)?;
            store.add(record)?;
            tracing::info!(credential_id = %id_hex, alg = key.algorithm, rp_id = %cfg.rp_id, "Registration imported");
            println!("{id_hex}");
        }
        Command::List => {
            let store = open_store(&registry_dir)?;
            tracing::info!(count = store.registration_count(), "Registration store loaded");
            for reg in store.get_by_rp(&cfg.rp_id) {
                println!(
                    "{}\t{}\t{}\t{}",
                    reg.credential_id_hex(),
                    if reg.enabled { "enabled" } else { "disabled" },
                    reg.nickname.as_deref().unwrap_or("-"),
                    reg.owner.as_deref().unwrap_or("-"),
                );
            }
        }
        Command::PublicKey { private_key } => {
            let signer = ContentSigner::from_private_key_hex(&private_key, Vec::new(), cfg.rp_id.clone())?;
            println!("{}", encoding::B64.encode(signer.public_cose_key().to_cbor()));
        }
        Command::Sign {
            private_key,
            credential_id,
            content,
            counter,
            user_present,
            user_verified,
        } => {
            let credential_id = encoding::decode_hex(&credential_id)
                .filter(|id| !id.is_empty())
                .ok_or_else(|| Error::Internal("--credential-id must be non-empty hex".into()))?;
            let signer = ContentSigner::from_private_key_hex(&private_key, credential_id, cfg.rp_id.clone())?;
            let content_hash = content_hash(&content)?;
            let info = signer.sign(
                &content_hash,
                user_present,
                user_verified,
                counter.unwrap_or_else(epoch_counter),
            )?;
            println!("{}", info.to_json());
        }
        Command::Verify { sig_info, content } => {
            let store = open_store(&registry_dir)?;
            let content_hash = content_hash(&content)?;
            let outcome = PhotoVerifier::new(&store, cfg.rp_id.clone()).verify(&content_hash, &sig_info);
            println!("{}", serde_json::to_string(&outcome)?);
        }
    }
    Ok(())
}

fn default_registry_dir() -> anyhow::Result<PathBuf> {
    Ok(directories::ProjectDirs::from("", "", "fidophoto")
        .ok_or_else(|| anyhow::anyhow!("cannot determine XDG data dir"))?
        .data_dir()
        .join("registrations"))
}

fn open_store(dir: &Path) -> error::Result<RegistrationStore> {
    std::fs::create_dir_all(dir)?;
    Ok(RegistrationStore::load(dir.to_path_buf())?)
}

/// Hex content hash, either given directly or SHA-256 of a file's bytes.
fn content_hash(args: &ContentArgs) -> error::Result<String> {
    match (&args.content_hash, &args.file) {
        (Some(hash), _) => Ok(hash.trim().to_ascii_lowercase()),
        (None, Some(path)) => Ok(assertion::authenticator_data::sha256_hex(&std::fs::read(path)?)),
        (None, None) => Err(Error::Internal("no content hash or file given".into())),
    }
}
