// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{binary_name, launch_args};

#[test]
fn headless_always_picks_s3270() {
    assert_eq!(binary_name(true), "s3270");
}

#[test]
fn gui_binary_matches_platform() {
    let name = binary_name(false);
    if cfg!(windows) {
        assert_eq!(name, "wc3270");
    } else {
        assert_eq!(name, "x3270");
    }
}

#[test]
fn headless_args_lead_with_the_script_port() {
    let args = launch_args("s3270", 5001, "mainframe", 3270, true);
    assert_eq!(
        args,
        vec![
            "-scriptport",
            "5001",
            "-xrm",
            "s3270.unlockDelay: False",
            "-model",
            "3279-2",
            "mainframe:3270",
        ]
    );
}

#[test]
fn gui_args_put_the_script_port_after_the_model() {
    let args = launch_args("x3270", 5002, "10.0.0.9", 23, false);
    assert_eq!(
        args,
        vec![
            "-xrm",
            "x3270.unlockDelay: False",
            "-model",
            "3279-2",
            "-scriptport",
            "5002",
            "10.0.0.9:23",
        ]
    );
}

#[test]
fn xrm_resource_is_keyed_by_binary_name() {
    let args = launch_args("wc3270", 5003, "h", 23, false);
    assert!(args.contains(&"wc3270.unlockDelay: False".to_string()));
}
