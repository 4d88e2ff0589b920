// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translates workflow steps into terminal adapter commands.

use std::path::Path;
use std::time::Duration;

use t3270_core::{AidKey, Configuration, Step, StepKind};
use t3270_adapters::{capture, TerminalAdapter};

use crate::error::StepError;
use crate::run::RunContext;

/// Default wait for a `WaitForField` step without an explicit delay.
pub const DEFAULT_FIELD_WAIT: Duration = Duration::from_secs(10);

/// Execute one step against the adapter.
///
/// `{{token}}` placeholders in step text are substituted from the
/// configuration immediately before the adapter call. `Disconnect` never
/// fails; the emulator is allowed to be already gone.
pub async fn execute_step<A: TerminalAdapter + ?Sized>(
    adapter: &A,
    step: &Step,
    config: &Configuration,
    ctx: &RunContext,
    output_path: &Path,
) -> Result<(), StepError> {
    match step.kind {
        StepKind::Connect => adapter.connect().await.map_err(|e| {
            if e.is_shutdown() {
                StepError::ShutdownRequested
            } else {
                StepError::ConnectFailed(e.to_string())
            }
        }),
        StepKind::Disconnect => {
            adapter.disconnect().await;
            Ok(())
        }
        StepKind::FillString => {
            let text = substitute(ctx, config, &step.text);
            let result = if step.coordinates.is_addressed() {
                adapter
                    .fill_string(step.coordinates.row, step.coordinates.column, &text)
                    .await
            } else {
                adapter.set_string(&text).await
            };
            result.map_err(|e| command_failed(step, e))
        }
        StepKind::CheckValue => {
            let expected = substitute(ctx, config, &step.text);
            let found = adapter
                .get_value(
                    step.coordinates.row,
                    step.coordinates.column,
                    step.coordinates.length,
                )
                .await
                .map_err(|e| command_failed(step, e))?;
            let found = found.trim();
            if found == expected.trim() {
                Ok(())
            } else {
                Err(StepError::CheckValueMismatch {
                    expected: expected.trim().to_string(),
                    found: found.to_string(),
                })
            }
        }
        StepKind::AsciiScreenGrab => {
            let lines = adapter
                .screen_contents()
                .await
                .map_err(|e| command_failed(step, e))?;
            capture::append_screen(output_path, ctx.options.api_mode, &lines)
                .map_err(|e| StepError::Capture(e.to_string()))
        }
        StepKind::InitializeOutput => {
            capture::initialize_output(output_path, ctx.options.api_mode)
                .map_err(|e| StepError::Capture(e.to_string()))
        }
        StepKind::WaitForField => {
            let timeout = step
                .delay
                .filter(|d| *d > 0.0)
                .map(Duration::from_secs_f64)
                .unwrap_or(DEFAULT_FIELD_WAIT);
            adapter
                .wait_for_field(timeout)
                .await
                .map_err(|e| command_failed(step, e))
        }
        StepKind::PressEnter => press(adapter, step, AidKey::Enter).await,
        StepKind::PressTab => press(adapter, step, AidKey::Tab).await,
        StepKind::PressPf(n) => {
            let key = AidKey::pf(n).map_err(|e| StepError::CommandFailed {
                step: step.kind.to_string(),
                message: e.to_string(),
            })?;
            press(adapter, step, key).await
        }
        StepKind::HumanDelay => {
            let delay = step.delay.unwrap_or(0.0);
            if delay > 0.0 {
                tokio::time::sleep(Duration::from_secs_f64(delay)).await;
            }
            Ok(())
        }
    }
}

async fn press<A: TerminalAdapter + ?Sized>(
    adapter: &A,
    step: &Step,
    key: AidKey,
) -> Result<(), StepError> {
    adapter.press(key).await.map_err(|e| command_failed(step, e))
}

fn command_failed(step: &Step, e: t3270_adapters::EmulatorError) -> StepError {
    if e.is_shutdown() {
        StepError::ShutdownRequested
    } else {
        StepError::CommandFailed {
            step: step.kind.to_string(),
            message: e.to_string(),
        }
    }
}

const TOKEN_PLACEHOLDER: &str = "{{token}}";

/// Replace `{{token}}` with the configured token. A placeholder with no
/// configured token warns once per run, not once per occurrence.
fn substitute(ctx: &RunContext, config: &Configuration, text: &str) -> String {
    if !text.contains(TOKEN_PLACEHOLDER) {
        return text.to_string();
    }
    match config.token.as_deref() {
        Some(token) => text.replace(TOKEN_PLACEHOLDER, token),
        None => {
            if ctx.warn_token_once() {
                tracing::warn!("step text references a token placeholder but no Token is configured");
            }
            text.to_string()
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
