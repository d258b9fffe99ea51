// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Remove a member from the IAM policy of a Cloud KMS crypto key.

mod args;

use args::Args;
use clap::Parser;
use kms_samples::remove_member_cryptokey;
use tokio_util::sync::CancellationToken;

const DESCRIPTION: &str = concat!(
    "This program removes a member from a role in the IAM policy of a",
    " Cloud KMS crypto key.",
    " The policy is updated with a single read-modify-write cycle. If the",
    " policy changes concurrently the program fails without changing it."
);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.validate()?;
    enable_tracing(&args);
    tracing::info!("Configuration: {args:?}");

    let client = args.client_config().build().await?;

    let cancel = CancellationToken::new();
    let _deadline = args.timeout.map(|timeout| {
        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            tracing::warn!("timeout ({timeout:?}) expired, cancelling");
            token.cancel();
        })
    });

    let mut stdout = std::io::stdout();
    let confirmation = remove_member_cryptokey::sample(
        &mut stdout,
        &client,
        &args.name,
        &args.member,
        &args.role,
        &cancel,
    )
    .await?;
    println!();
    if !confirmation.binding_removed() {
        tracing::info!(
            "{} did not have {} in the policy",
            confirmation.member(),
            confirmation.role()
        );
    }
    tracing::info!("DONE");

    Ok(())
}

fn enable_tracing(args: &Args) {
    use tracing_subscriber::fmt::format::FmtSpan;
    let max_level = if args.tracing {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_level(true)
        .with_thread_ids(true)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();
}
