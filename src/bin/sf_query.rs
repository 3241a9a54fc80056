//! Run a SOQL query against an org and print the records as JSON.
//!
//! ```sh
//! # Session from the Salesforce CLI
//! export SF_ALIAS=my-org
//! # ...or from an explicit token
//! export SF_INSTANCE_URL=https://acme.my.salesforce.com
//! export SF_ACCESS_TOKEN=00D...
//!
//! cargo run --bin sf-query -- "SELECT Id, Name FROM Account"
//! SF_TOOLING=1 cargo run --bin sf-query -- --all "SELECT Id FROM ApexClass"
//! ```

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use sf_inspector::{ApiClient, ClientConfig, EnvAuthority, QueryOptions, SfCliAuthority};

fn init_logging() {
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Pick the session source: `SF_ALIAS` wins over `SF_INSTANCE_URL`/`SF_ACCESS_TOKEN`.
async fn authority_from_env() -> anyhow::Result<EnvAuthority> {
    match std::env::var("SF_ALIAS") {
        Ok(alias) if !alias.is_empty() => {
            let grant = SfCliAuthority::new(alias.as_str())
                .org_display()
                .await
                .with_context(|| format!("no sf CLI session for {alias}"))?;
            Ok(EnvAuthority::new(&grant.hostname, grant.key)?)
        }
        _ => EnvAuthority::from_env()
            .context("set SF_ALIAS, or SF_INSTANCE_URL and SF_ACCESS_TOKEN"),
    }
}

fn env_flag(name: &str) -> bool {
    matches!(
        std::env::var(name).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let mut fetch_all = false;
    let mut soql = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--all" => fetch_all = true,
            _ if soql.is_none() => soql = Some(arg),
            _ => bail!("unexpected argument: {arg}"),
        }
    }
    let Some(soql) = soql else {
        bail!("usage: sf-query [--all] \"<SOQL>\"");
    };

    let authority = authority_from_env().await?;

    let mut config = ClientConfig::builder();
    if let Ok(version) = std::env::var("SF_API_VERSION") {
        config = config.with_api_version(version);
    }

    let host = authority.hostname().to_string();
    let client = ApiClient::builder(host)
        .with_config(config.build())
        .with_authority(Arc::new(authority))
        .build()?;
    client.connect(None).await?;

    let options = QueryOptions {
        use_tooling: env_flag("SF_TOOLING"),
        ..QueryOptions::default()
    };

    let records = if fetch_all {
        client.query_all(&soql, &options).await?
    } else {
        let page = client.query(&soql, &options).await?;
        page["records"].as_array().cloned().unwrap_or_default()
    };

    println!("{}", serde_json::to_string_pretty(&records)?);
    eprintln!("{} record(s)", records.len());
    Ok(())
}
