//! Auth command - provider credentials and OAuth.

use anyhow::{Context as _, Result};
use clap::Args;
use console::Style;
use mix_client::{AuthStatus, KNOWN_PROVIDERS, MixClient};

use super::{Context, banner, failure, field, finished, note, print_json, step, success};

/// Environment variables holding API keys, by provider.
const KEY_VARS: &[(&str, &str)] = &[
    ("openrouter", "OPENROUTER_API_KEY"),
    ("anthropic", "ANTHROPIC_API_KEY"),
    ("openai", "OPENAI_API_KEY"),
    ("gemini", "GEMINI_API_KEY"),
    ("brave", "BRAVE_API_KEY"),
];

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    /// Provider to start the OAuth flow for
    #[arg(long, default_value = "anthropic")]
    pub oauth_provider: String,

    /// Delete this provider's stored credentials at the end
    #[arg(long)]
    pub delete_provider: Option<String>,
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    if ctx.json_output {
        let status = client
            .authentication()
            .status()
            .await
            .context("Failed to get auth status")?;
        return print_json(&status);
    }

    banner("Mix - Authentication Walkthrough");

    step(1, "Checking authentication status...");
    let status = client
        .authentication()
        .status()
        .await
        .context("Failed to get auth status")?;
    print_status(&status);
    println!();

    step(2, "Storing API keys from the environment...");
    store_env_keys(&client).await;
    println!();

    step(3, "Re-checking authentication status...");
    match client.authentication().status().await {
        Ok(status) => print_status(&status),
        Err(e) => failure("get auth status", e),
    }
    println!();

    step(4, "Validating the preferred provider...");
    match client.authentication().validate_preferred().await {
        Ok(v) => {
            field("Valid:", v.valid.unwrap_or(false));
            if let Some(provider) = &v.provider {
                field("Provider:", provider);
            }
            if let Some(method) = &v.auth_method {
                field("Method:", method);
            }
            if let Some(message) = &v.message {
                field("Message:", message);
            }
        }
        Err(e) => failure("validate preferred provider", e),
    }
    println!();

    step(5, &format!("Starting OAuth for {}...", args.oauth_provider));
    match client.authentication().start_oauth(&args.oauth_provider).await {
        Ok(start) => {
            if let Some(url) = &start.auth_url {
                field("Visit:", url);
            }
            if let Some(state) = &start.state {
                field("State:", state);
            }
            if let Some(message) = &start.message {
                field("Message:", message);
            }
            note("Complete the flow in a browser; the server stores the tokens");
        }
        Err(e) => failure("start OAuth flow", e),
    }
    println!();

    step(6, "Checking OAuth token health...");
    match client.authentication().oauth_health().await {
        Ok(health) => println!("{}", serde_json::to_string_pretty(&health)?),
        Err(e) => failure("check OAuth health", e),
    }
    println!();

    step(7, "Refreshing OAuth tokens...");
    match client.authentication().refresh_oauth_tokens().await {
        Ok(()) => success("Refresh requested"),
        Err(e) => failure("refresh OAuth tokens", e),
    }

    if let Some(provider) = &args.delete_provider {
        println!();
        step(8, &format!("Deleting credentials for {}...", provider));
        match client.authentication().delete_credentials(provider).await {
            Ok(()) => success("Credentials deleted"),
            Err(e) => failure("delete credentials", e),
        }
    }

    finished("Authentication");
    Ok(())
}

fn print_status(status: &AuthStatus) {
    let yes = Style::new().green();
    let no = Style::new().red();
    for provider in KNOWN_PROVIDERS {
        let entry = status.providers.get(*provider).cloned().unwrap_or_default();
        let mark = if entry.is_authenticated() {
            yes.apply_to("✓").to_string()
        } else {
            no.apply_to("✗").to_string()
        };
        match &entry.auth_method {
            Some(method) => println!("   {} {} ({})", mark, provider, method),
            None => println!("   {} {}", mark, provider),
        }
    }
}

async fn store_env_keys(client: &MixClient) {
    let mut stored = 0;
    for (provider, var) in KEY_VARS {
        let Some(key) = env_key(var) else {
            continue;
        };
        match client.authentication().store_api_key(*provider, key).await {
            Ok(()) => {
                success(format!("Stored {} key from {}", provider, var));
                stored += 1;
            }
            Err(e) => failure(&format!("store {} key", provider), e),
        }
    }
    if stored == 0 {
        let names: Vec<_> = KEY_VARS.iter().map(|(_, var)| *var).collect();
        note(format!("No keys found; set one of {}", names.join(", ")));
    }
}

fn env_key(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}
