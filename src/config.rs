use std::path::PathBuf;

pub const DEFAULT_RP_ID: &str = "www.fidophoto.com";
/// Shortest token secret the preflight check accepts.
pub const MIN_SECRET_LEN: usize = 16;

#[derive(clap::Parser, Debug, Clone)]
#[command(name = "fidophoto", version, about)]
pub struct Config {
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Server secret for issuing and validating access tokens.
    #[arg(long, env = "FIDOPHOTO_SECRET", hide_env_values = true, global = true)]
    pub secret: Option<String>,
    /// Relying party the registered credentials are scoped to.
    #[arg(long, env = "FIDOPHOTO_RP_ID", default_value = DEFAULT_RP_ID, global = true)]
    pub rp_id: String,
    /// Directory of registration records (defaults to the XDG data dir).
    #[arg(long, env = "FIDOPHOTO_REGISTRY_DIR", global = true)]
    pub registry_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Issue an access token for an account id.
    IssueToken { account: String },
    /// Print the account id a token belongs to, or "invalid".
    ResolveToken { token: String },
    /// Store a registered credential for the configured relying party.
    Import {
        /// Credential id, hex.
        #[arg(long)]
        credential_id: String,
        /// COSE_Key, base64.
        #[arg(long)]
        public_key: String,
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        disabled: bool,
        #[arg(long, default_value_t = 0)]
        counter: u32,
    },
    /// List registrations for the configured relying party.
    List,
    /// Print the base64 COSE_Key for a P-256 private key.
    PublicKey {
        #[arg(long)]
        private_key: String,
    },
    /// Sign a content hash and print the MakerNote JSON.
    Sign {
        /// P-256 private scalar, hex.
        #[arg(long)]
        private_key: String,
        /// Credential id, hex.
        #[arg(long)]
        credential_id: String,
        #[command(flatten)]
        content: ContentArgs,
        /// Signature counter (defaults to the current Unix time).
        #[arg(long)]
        counter: Option<u32>,
        #[arg(long)]
        user_present: bool,
        #[arg(long)]
        user_verified: bool,
    },
    /// Verify MakerNote JSON against registered credentials.
    Verify {
        #[arg(long)]
        sig_info: String,
        #[command(flatten)]
        content: ContentArgs,
    },
}

impl Command {
    pub fn needs_secret(&self) -> bool {
        matches!(self, Command::IssueToken { .. } | Command::ResolveToken { .. })
    }

    pub fn needs_registry(&self) -> bool {
        matches!(
            self,
            Command::Import { .. } | Command::List | Command::Verify { .. }
        )
    }
}

#[derive(clap::Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ContentArgs {
    /// SHA-256 of the content, hex.
    #[arg(long)]
    pub content_hash: Option<String>,
    /// Hash this file's bytes instead.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_verify() {
        let cfg = Config::try_parse_from([
            "fidophoto",
            "-vv",
            "--rp-id",
            "example.test",
            "verify",
            "--sig-info",
            "{}",
            "--content-hash",
            "ab",
        ])
        .unwrap();
        assert_eq!(cfg.verbose, 2);
        assert_eq!(cfg.rp_id, "example.test");
        assert!(cfg.command.needs_registry());
        assert!(!cfg.command.needs_secret());
    }

    #[test]
    fn test_content_source_is_exclusive() {
        let res = Config::try_parse_from([
            "fidophoto",
            "verify",
            "--sig-info",
            "{}",
            "--content-hash",
            "ab",
            "--file",
            "x.jpg",
        ]);
        assert!(res.is_err());
        let res = Config::try_parse_from(["fidophoto", "verify", "--sig-info", "{}"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_issue_token_needs_secret() {
        let cfg = Config::try_parse_from(["fidophoto", "issue-token", "alice"]).unwrap();
        assert!(cfg.command.needs_secret());
    }
}
