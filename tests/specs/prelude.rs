// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for workspace specs.

use t3270_core::{Configuration, Step, StepKind};

/// A minimal valid configuration against the loopback host.
pub fn workflow(steps: Vec<Step>) -> Configuration {
    Configuration {
        host: "127.0.0.1".to_string(),
        port: 3270,
        steps,
        output_file_path: None,
        wait_for_field: false,
        token: None,
        ramp_up_batch_size: 10,
        ramp_up_delay: 1.0,
        input_file_path: None,
    }
}

/// The canonical sign-on step list, minus the screen grab.
pub fn login_steps() -> Vec<Step> {
    vec![
        Step::new(StepKind::Connect),
        Step::at(StepKind::FillString, 4, 20, "user1"),
        Step::new(StepKind::PressEnter),
        Step::new(StepKind::Disconnect),
    ]
}
