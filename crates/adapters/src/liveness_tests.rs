// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{FakeProbe, ProcessProbe, SysinfoProbe};

#[test]
fn own_process_is_alive() {
    let probe = SysinfoProbe;
    assert!(probe.is_alive(std::process::id()));
}

#[test]
fn nonexistent_pid_is_not_alive() {
    let probe = SysinfoProbe;
    // PIDs near the typical pid_max are very unlikely to exist.
    assert!(!probe.is_alive(4_194_000));
}

#[test]
fn fake_probe_follows_its_script() {
    let probe = FakeProbe::new();
    assert!(!probe.is_alive(1234));
    probe.set_alive(1234, true);
    assert!(probe.is_alive(1234));
    probe.set_alive(1234, false);
    assert!(!probe.is_alive(1234));
}
