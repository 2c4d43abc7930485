//! `cfg`: resolved configuration with the source of every value.
//!
//! ```json
//! {
//!   "starting_balance": { "value": 5000, "source": "default" },
//!   "seed": { "value": 42, "source": "env" },
//!   ...
//! }
//! ```

use crate::config;
use crate::error::CliError;
use crate::ui;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let resolved = match config::load_with_sources() {
        Ok(r) => r,
        Err(e) => {
            ui::write_error(err, &e.to_string())?;
            return Err(e.into());
        }
    };

    let config::ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "starting_balance": {
            "value": config.starting_balance,
            "source": sources.starting_balance,
        },
        "default_bet": {
            "value": config.default_bet,
            "source": sources.default_bet,
        },
        "spin_delay_ms": {
            "value": config.spin_delay_ms,
            "source": sources.spin_delay_ms,
        },
        "auto_roll_delay_ms": {
            "value": config.auto_roll_delay_ms,
            "source": sources.auto_roll_delay_ms,
        },
        "seed": {
            "value": config.seed,
            "source": sources.seed,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
