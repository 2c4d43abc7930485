//! `spin`: plays through a lobby and a [`SpinController`], the same path an
//! interactive front end takes.
//!
//! Pacing delays are switched off. With `--auto` the controller's auto-roll
//! drives the spins and this command only follows the event stream.

use crate::config;
use crate::error::CliError;
use crate::ui;
use spinhall_engine::ledger::Credits;
use spinhall_engine::machine::GameKind;
use spinhall_session::controller::{BetError, SpinController, SpinOutcome, SpinRejection};
use spinhall_session::events::SpinEvent;
use spinhall_session::lobby::Lobby;
use spinhall_session::settings::SessionSettings;
use std::io::Write;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SpinArgs {
    pub game: GameKind,
    pub bet: Option<Credits>,
    pub spins: u64,
    pub seed: Option<u64>,
    pub balance: Option<Credits>,
    pub auto: bool,
}

pub fn handle_spin_command(
    args: SpinArgs,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if args.spins == 0 {
        ui::write_error(err, "spins must be >= 1")?;
        return Err(CliError::InvalidInput("spins must be >= 1".to_string()));
    }
    let cfg = config::load()?;
    let settings = SessionSettings {
        starting_balance: args.balance.unwrap_or(cfg.starting_balance),
        spin_delay_ms: 0,
        // auto-roll needs a real await point between spins to hand control back
        auto_roll_delay_ms: if args.auto { 1 } else { 0 },
        seed: args.seed.or(cfg.seed),
        ..cfg.to_settings()
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    rt.block_on(async {
        let lobby = Lobby::new(settings)?;
        let controller = lobby.open_game(args.game)?;
        if let Some(bet) = args.bet {
            controller.set_bet(bet).map_err(|e| {
                let msg = match e {
                    BetError::ZeroBet => "bet must be >= 1".to_string(),
                    other => other.to_string(),
                };
                CliError::InvalidInput(msg)
            })?;
        }

        writeln!(
            out,
            "{} | bet {} | balance {}",
            args.game,
            controller.state().bet,
            lobby.ledger().balance()
        )?;

        let played = if args.auto {
            auto_spins(&lobby, &controller, args.spins, out, err).await?
        } else {
            manual_spins(&controller, args.spins, out, err).await?
        };

        writeln!(
            out,
            "Played {} spin(s). Final balance: {}",
            played,
            lobby.ledger().balance()
        )?;
        lobby.shutdown();
        Ok::<(), CliError>(())
    })
}

async fn manual_spins(
    controller: &Arc<SpinController>,
    spins: u64,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<u64, CliError> {
    let mut played = 0u64;
    for _ in 0..spins {
        match controller.spin().await {
            SpinOutcome::Completed(result) => {
                played += 1;
                writeln!(
                    out,
                    "{}",
                    ui::spin_line(played, &result.reels, result.winnings, result.balance)
                )?;
            }
            SpinOutcome::Rejected(rejection) => {
                warn_rejected(err, played, &rejection)?;
                break;
            }
            SpinOutcome::Ignored | SpinOutcome::Cancelled { .. } => break,
        }
    }
    Ok(played)
}

async fn auto_spins(
    lobby: &Lobby,
    controller: &Arc<SpinController>,
    spins: u64,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<u64, CliError> {
    let mut subscription = lobby.events().subscribe(controller.id().clone());
    controller.toggle_auto_roll();

    if let SpinOutcome::Rejected(rejection) = controller.spin().await {
        warn_rejected(err, 0, &rejection)?;
        return Ok(0);
    }

    let mut played = 0u64;
    while let Some(event) = subscription.receiver().recv().await {
        match event {
            SpinEvent::SpinCompleted {
                reels,
                winnings,
                balance,
                ..
            } => {
                played += 1;
                writeln!(out, "{}", ui::spin_line(played, &reels, winnings, balance))?;
                if played >= spins {
                    if controller.state().auto_roll {
                        controller.toggle_auto_roll();
                    }
                    controller.cancel();
                    break;
                }
            }
            SpinEvent::AutoRollChanged { enabled: false, .. } => {
                ui::display_warning(
                    err,
                    &format!("auto-roll stopped after {} spins: balance too low", played),
                )?;
                break;
            }
            _ => {}
        }
    }
    Ok(played)
}

fn warn_rejected(
    err: &mut dyn Write,
    played: u64,
    rejection: &SpinRejection,
) -> std::io::Result<()> {
    ui::display_warning(err, &format!("stopped after {} spins: {}", played, rejection))
}
