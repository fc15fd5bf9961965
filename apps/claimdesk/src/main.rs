//! # ClaimDesk
//!
//! Terminal client for the ClaimDesk document-chat and claims-analytics
//! backend.
//!
//! ## Usage
//!
//! ```bash
//! claimdesk login --email me@example.com --password secret
//! claimdesk upload-pdf policy.pdf
//! claimdesk chat "What is the deductible?"
//! claimdesk query "How many claims were denied last month?" --top-k 5
//! claimdesk dashboard
//! ```

use clap::Parser;
use claimdesk::cli::{self, Cli};
use claimdesk::logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
