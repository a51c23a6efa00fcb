//! Campaign file loading.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use collie_defence_world::{CampaignConfig, LevelConfig, PlayerSettings};

/// Reads a campaign from `path`, falling back to the built-in campaign.
///
/// A file holding a single level is wrapped into a one-level campaign with
/// default starting resources.
pub(crate) fn load(path: Option<&Path>) -> Result<CampaignConfig> {
    let Some(path) = path else {
        return Ok(CampaignConfig::builtin());
    };

    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse(text: &str) -> Result<CampaignConfig> {
    match toml::from_str::<CampaignConfig>(text) {
        Ok(campaign) => Ok(campaign),
        Err(campaign_error) => {
            let level: LevelConfig = toml::from_str(text)
                .map_err(|_| campaign_error)
                .context("expected a campaign or a single level")?;
            let settings = PlayerSettings::default();
            Ok(CampaignConfig {
                starting_money: settings.starting_money,
                starting_health: settings.starting_health,
                income: settings.income,
                levels: vec![level],
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_level_file_becomes_a_campaign() {
        let level = toml::to_string(&CampaignConfig::builtin().levels[0]).expect("serialise");
        let campaign = parse(&level).expect("level file");
        assert_eq!(campaign.levels.len(), 1);
        assert_eq!(campaign.starting_money, PlayerSettings::default().starting_money);
    }

    #[test]
    fn campaign_file_round_trips() {
        let builtin = CampaignConfig::builtin();
        let text = toml::to_string(&builtin).expect("serialise");
        assert_eq!(parse(&text).expect("campaign file"), builtin);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse("starting_money = \"lots\"").is_err());
    }
}
