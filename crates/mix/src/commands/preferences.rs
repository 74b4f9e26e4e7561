//! Preferences command - model and provider preferences.

use anyhow::{Context as _, Result};
use clap::Args;
use mix_client::{MixClient, Preferences, PreferencesResponse};

use super::{Context, banner, failure, field, finished, note, print_json, step, success, truncate};

/// Arguments for the preferences command.
#[derive(Args, Debug)]
pub struct PreferencesArgs {
    /// Leave the updated preferences in place instead of resetting
    #[arg(long)]
    pub keep: bool,
}

/// Run the preferences command.
pub async fn run(args: PreferencesArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    if ctx.json_output {
        let current = client
            .preferences()
            .get()
            .await
            .context("Failed to get preferences")?;
        return print_json(&current);
    }

    banner("Mix - Preferences Walkthrough");

    step(1, "Getting current preferences...");
    let current = client
        .preferences()
        .get()
        .await
        .context("Failed to get preferences")?;
    match &current.preferences {
        Some(prefs) => print_preferences(prefs),
        None => note("No preferences stored yet"),
    }
    println!();

    step(2, "Available providers...");
    print_providers(&current);
    println!();

    step(3, "Applying partial updates...");
    let (main_model, sub_model) = pick_models(&current);
    let updates = [
        (
            "main agent model",
            Preferences {
                main_agent_model: main_model.clone(),
                ..Default::default()
            },
        ),
        (
            "sub agent model",
            Preferences {
                sub_agent_model: sub_model.clone(),
                ..Default::default()
            },
        ),
        (
            "main agent max tokens",
            Preferences {
                main_agent_max_tokens: Some(4096),
                ..Default::default()
            },
        ),
        (
            "main agent reasoning effort",
            Preferences {
                main_agent_reasoning_effort: Some("medium".into()),
                ..Default::default()
            },
        ),
    ];
    for (what, update) in &updates {
        if update == &Preferences::default() {
            note(format!("Skipping {}: no model available", what));
            continue;
        }
        apply(&client, what, update).await;
    }
    println!();

    step(4, "Updating several fields at once...");
    let combined = Preferences {
        preferred_provider: current.available_providers.keys().next().cloned(),
        main_agent_model: main_model,
        sub_agent_model: sub_model,
        main_agent_max_tokens: Some(8192),
        sub_agent_max_tokens: Some(2048),
        main_agent_reasoning_effort: Some("high".into()),
        sub_agent_reasoning_effort: Some("low".into()),
    };
    apply(&client, "all fields", &combined).await;
    println!();

    step(5, "Verifying...");
    match client.preferences().get().await {
        Ok(PreferencesResponse {
            preferences: Some(prefs),
            ..
        }) => print_preferences(&prefs),
        Ok(_) => note("No preferences stored"),
        Err(e) => failure("get preferences", e),
    }
    println!();

    if args.keep {
        note("Keeping updated preferences (--keep)");
    } else {
        step(6, "Resetting to defaults...");
        match client.preferences().reset().await {
            Ok(prefs) => {
                success("Preferences reset");
                print_preferences(&prefs);
            }
            Err(e) => failure("reset preferences", e),
        }
    }

    finished("Preferences");
    Ok(())
}

async fn apply(client: &MixClient, what: &str, update: &Preferences) {
    match client.preferences().update(update).await {
        Ok(_) => success(format!("Updated {}", what)),
        Err(e) => failure(&format!("update {}", what), e),
    }
}

fn print_preferences(prefs: &Preferences) {
    let entries = prefs.entries();
    if entries.is_empty() {
        note("(all defaults)");
    }
    for (label, value) in entries {
        field(&format!("{}:", label), value);
    }
}

fn print_providers(current: &PreferencesResponse) {
    if current.available_providers.is_empty() {
        note("No providers available");
        return;
    }
    for (key, info) in current.available_providers.iter().take(5) {
        let name = info.name.as_deref().unwrap_or(key);
        println!("   - {} ({} models)", name, info.models.len());
        if !info.models.is_empty() {
            note(truncate(&info.models.join(", "), 80));
        }
    }
    if current.available_providers.len() > 5 {
        note(format!("... and {} more", current.available_providers.len() - 5));
    }
}

/// First and last model of the first provider that lists any.
fn pick_models(current: &PreferencesResponse) -> (Option<String>, Option<String>) {
    current
        .available_providers
        .values()
        .find(|p| !p.models.is_empty())
        .map(|p| (p.models.first().cloned(), p.models.last().cloned()))
        .unwrap_or((None, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mix_client::ProviderInfo;

    #[test]
    fn test_pick_models_skips_empty_providers() {
        let mut current = PreferencesResponse::default();
        current
            .available_providers
            .insert("a".into(), ProviderInfo::default());
        current.available_providers.insert(
            "b".into(),
            ProviderInfo {
                name: Some("B".into()),
                models: vec!["big".into(), "small".into()],
            },
        );
        assert_eq!(
            pick_models(&current),
            (Some("big".into()), Some("small".into()))
        );
    }

    #[test]
    fn test_pick_models_none_available() {
        assert_eq!(pick_models(&PreferencesResponse::default()), (None, None));
    }
}
