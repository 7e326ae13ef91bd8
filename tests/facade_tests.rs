//! Behavioural equivalence tests: every property is checked against both
//! backends, the direct one over a `MockController` and the daemon one
//! over a `MockTransport` wrapping an identical controller.

use rpi_periph::{Error, Level, Mode, MockController, MockTransport, Pi, Pull};

/// Both backends over identical simulated hardware, with a probe each.
fn rigs() -> Vec<(&'static str, Pi, MockController)> {
    let direct_ctrl = MockController::new();
    let direct = Pi::direct(Box::new(direct_ctrl.clone())).unwrap();

    let daemon_ctrl = MockController::new();
    let daemon = Pi::with_transport(Box::new(MockTransport::new(daemon_ctrl.clone())));

    vec![("direct", direct, direct_ctrl), ("daemon", daemon, daemon_ctrl)]
}

#[test]
fn set_mode_then_get_mode_round_trips() {
    for (name, pi, _) in rigs() {
        pi.set_mode(17, Mode::Alt0).unwrap();
        assert_eq!(pi.get_mode(17).unwrap(), Mode::Alt0, "{name}");
        pi.set_mode(17, Mode::Input).unwrap();
        assert_eq!(pi.get_mode(17).unwrap(), Mode::Input, "{name}");
    }
}

#[test]
fn write_reaches_the_controller() {
    for (name, pi, ctrl) in rigs() {
        pi.set_mode(17, Mode::Output).unwrap();
        pi.write(17, Level::High).unwrap();
        assert_eq!(ctrl.pin_level(17), 1, "{name}");
        pi.write(17, Level::Low).unwrap();
        assert_eq!(ctrl.pin_level(17), 0, "{name}");
    }
}

#[test]
fn read_reflects_an_external_signal() {
    for (name, pi, ctrl) in rigs() {
        pi.set_mode(4, Mode::Input).unwrap();
        ctrl.set_input_level(4, true);
        assert_eq!(pi.read(4).unwrap(), Level::High, "{name}");
    }
}

#[test]
fn toggle_inverts_the_level() {
    for (name, pi, ctrl) in rigs() {
        pi.set_mode(17, Mode::Output).unwrap();
        pi.write(17, Level::High).unwrap();
        assert_eq!(pi.toggle(17).unwrap(), Level::Low, "{name}");
        assert_eq!(ctrl.pin_level(17), 0, "{name}");
        assert_eq!(pi.toggle(17).unwrap(), Level::High, "{name}");
        assert_eq!(ctrl.pin_level(17), 1, "{name}");
    }
}

#[test]
fn pull_setting_reaches_the_controller() {
    for (name, pi, ctrl) in rigs() {
        pi.set_pull_up_down(4, Pull::Up).unwrap();
        assert_eq!(ctrl.pin_pull(4), 2, "{name}");
    }
}

#[test]
fn pwm_parameters_behave_identically() {
    for (name, pi, _) in rigs() {
        // Frequency snaps to the closest supported value.
        assert_eq!(pi.set_pwm_frequency(17, 900).unwrap(), 800, "{name}");
        assert_eq!(pi.get_pwm_frequency(17).unwrap(), 800, "{name}");
        assert_eq!(pi.get_pwm_real_range(17).unwrap(), 250, "{name}");

        pi.set_pwm_dutycycle(17, 128).unwrap();
        assert_eq!(pi.get_pwm_dutycycle(17).unwrap(), 128, "{name}");

        // Changing the range keeps the duty fraction.
        pi.set_pwm_range(17, 1000).unwrap();
        assert_eq!(pi.get_pwm_range(17).unwrap(), 1000, "{name}");
        assert_eq!(pi.get_pwm_dutycycle(17).unwrap(), 501, "{name}");
    }
}

#[test]
fn duty_cycle_above_range_is_rejected_not_clamped() {
    for (name, pi, _) in rigs() {
        assert!(
            matches!(pi.set_pwm_dutycycle(17, 256), Err(Error::BadDutycycle)),
            "{name}"
        );
    }
}

#[test]
fn hardware_pwm_checks_pin_capability() {
    for (name, pi, ctrl) in rigs() {
        pi.hardware_pwm(18, 5000, 250_000).unwrap();
        assert_eq!(ctrl.hardware_pwm_state(18), Some((5000, 250_000)), "{name}");
        assert!(
            matches!(pi.hardware_pwm(17, 5000, 250_000), Err(Error::NotHpwmGpio)),
            "{name}"
        );
    }
}

#[test]
fn servo_pulsewidth_round_trips_and_zero_disables() {
    for (name, pi, _) in rigs() {
        pi.set_servo_pulsewidth(17, 1500).unwrap();
        assert_eq!(pi.get_servo_pulsewidth(17).unwrap(), 1500, "{name}");
        pi.set_servo_pulsewidth(17, 0).unwrap();
        assert_eq!(pi.get_servo_pulsewidth(17).unwrap(), 0, "{name}");
    }
}

#[test]
fn spi_open_write_read_close_scenario() {
    for (name, pi, ctrl) in rigs() {
        let h = pi.spi_open(0, 50_000, 0).unwrap();

        pi.spi_write(h, &[0x01, 0x02]).unwrap();
        assert_eq!(ctrl.spi_written(0), vec![vec![0x01, 0x02]], "{name}");

        ctrl.push_spi_read_data(0, &[0xaa, 0xbb]);
        assert_eq!(pi.spi_read(h, 2).unwrap(), vec![0xaa, 0xbb], "{name}");

        pi.spi_close(h).unwrap();
        assert!(matches!(pi.spi_read(h, 2), Err(Error::BadHandle)), "{name}");
    }
}

#[test]
fn spi_xfer_returns_exactly_tx_len_bytes() {
    for (name, pi, ctrl) in rigs() {
        let h = pi.spi_open(1, 1_000_000, 0).unwrap();
        // Only one byte programmed; the rest of the reply is padding, but
        // the length contract still holds.
        ctrl.push_spi_read_data(1, &[0x55]);
        let rx = pi.spi_xfer(h, &[1, 2, 3, 4]).unwrap();
        assert_eq!(rx.len(), 4, "{name}");
        assert_eq!(rx[0], 0x55, "{name}");
    }
}

#[test]
fn short_transfers_surface_as_errors_on_both_backends() {
    for (name, pi, ctrl) in rigs() {
        let spi = pi.spi_open(0, 50_000, 0).unwrap();
        let i2c = pi.i2c_open(1, 0x48, 0).unwrap();
        ctrl.short_transfers();

        assert!(
            matches!(pi.spi_read(spi, 4), Err(Error::SpiTransferFailed)),
            "{name}"
        );
        assert!(
            matches!(pi.spi_write(spi, &[1, 2]), Err(Error::SpiTransferFailed)),
            "{name}"
        );
        assert!(
            matches!(pi.spi_xfer(spi, &[1, 2, 3]), Err(Error::SpiTransferFailed)),
            "{name}"
        );
        assert!(
            matches!(pi.i2c_read_device(i2c, 4), Err(Error::I2cReadFailed)),
            "{name}"
        );
    }
}

#[test]
fn short_device_write_fails_on_the_direct_backend() {
    let ctrl = MockController::new();
    let pi = Pi::direct(Box::new(ctrl.clone())).unwrap();
    let i2c = pi.i2c_open(1, 0x48, 0).unwrap();
    ctrl.short_transfers();

    assert!(matches!(
        pi.i2c_write_device(i2c, &[1, 2]),
        Err(Error::I2cWriteFailed)
    ));
}

#[test]
fn two_spi_opens_yield_independent_handles() {
    for (name, pi, _) in rigs() {
        let a = pi.spi_open(0, 50_000, 0).unwrap();
        let b = pi.spi_open(1, 50_000, 0).unwrap();
        assert_ne!(a, b, "{name}");
        pi.spi_close(a).unwrap();
        // Closing one must not invalidate the other.
        assert!(pi.spi_read(b, 1).is_ok(), "{name}");
        pi.spi_close(b).unwrap();
    }
}

#[test]
fn closed_handle_value_is_not_resurrected_by_reopen() {
    for (name, pi, _) in rigs() {
        let stale = pi.spi_open(0, 50_000, 0).unwrap();
        pi.spi_close(stale).unwrap();
        let fresh = pi.spi_open(0, 50_000, 0).unwrap();
        assert_ne!(stale, fresh, "{name}");
        assert!(matches!(pi.spi_read(stale, 1), Err(Error::BadHandle)), "{name}");
        assert!(pi.spi_read(fresh, 1).is_ok(), "{name}");
    }
}

#[test]
fn i2c_register_operations() {
    for (name, pi, ctrl) in rigs() {
        let h = pi.i2c_open(1, 0x20, 0).unwrap();

        pi.i2c_write_byte_data(h, 0x10, 0xab).unwrap();
        assert_eq!(ctrl.i2c_register(1, 0x20, 0x10), 0xab, "{name}");
        assert_eq!(pi.i2c_read_byte_data(h, 0x10).unwrap(), 0xab, "{name}");

        pi.i2c_write_word_data(h, 0x20, 0xbeef).unwrap();
        assert_eq!(pi.i2c_read_word_data(h, 0x20).unwrap(), 0xbeef, "{name}");

        pi.i2c_write_i2c_block_data(h, 0x30, &[1, 2, 3]).unwrap();
        assert_eq!(
            pi.i2c_read_i2c_block_data(h, 0x30, 3).unwrap(),
            vec![1, 2, 3],
            "{name}"
        );

        pi.i2c_close(h).unwrap();
        assert!(matches!(pi.i2c_read_byte(h), Err(Error::BadHandle)), "{name}");
    }
}

#[test]
fn i2c_device_level_operations() {
    for (name, pi, ctrl) in rigs() {
        let h = pi.i2c_open(1, 0x48, 0).unwrap();

        pi.i2c_write_device(h, &[0x01, 0x02]).unwrap();
        assert_eq!(ctrl.i2c_device_written(1, 0x48), vec![vec![0x01, 0x02]], "{name}");

        ctrl.push_i2c_device_data(1, 0x48, &[0x11, 0x22, 0x33]);
        assert_eq!(
            pi.i2c_read_device(h, 3).unwrap(),
            vec![0x11, 0x22, 0x33],
            "{name}"
        );

        pi.i2c_write_byte(h, 0x42).unwrap();
        ctrl.push_i2c_device_data(1, 0x48, &[0x99]);
        assert_eq!(pi.i2c_read_byte(h).unwrap(), 0x99, "{name}");
    }
}

#[test]
fn i2c_smbus_block_read_uses_device_length() {
    for (name, pi, ctrl) in rigs() {
        let h = pi.i2c_open(1, 0x20, 0).unwrap();
        ctrl.set_i2c_block(1, 0x20, 0x40, &[7, 8, 9]);
        assert_eq!(pi.i2c_read_block_data(h, 0x40).unwrap(), vec![7, 8, 9], "{name}");
    }
}

#[test]
fn i2c_block_over_32_bytes_is_a_parameter_error() {
    for (name, pi, _) in rigs() {
        let h = pi.i2c_open(1, 0x20, 0).unwrap();
        let big = [0u8; 33];
        assert!(
            matches!(pi.i2c_write_i2c_block_data(h, 0x00, &big), Err(Error::BadParam)),
            "{name}"
        );
        assert!(
            matches!(pi.i2c_read_i2c_block_data(h, 0x00, 33), Err(Error::BadParam)),
            "{name}"
        );
    }
}

#[test]
fn disconnect_invalidates_everything() {
    for (name, pi, _) in rigs() {
        pi.set_mode(17, Mode::Output).unwrap();
        let spi = pi.spi_open(0, 50_000, 0).unwrap();
        let i2c = pi.i2c_open(1, 0x20, 0).unwrap();

        pi.disconnect().unwrap();
        pi.disconnect().unwrap(); // idempotent

        assert!(pi.write(17, Level::High).is_err(), "{name}");
        assert!(matches!(pi.spi_read(spi, 1), Err(Error::BadHandle) | Err(Error::NotConnected) | Err(Error::NotInitialised)), "{name}");
        assert!(matches!(pi.i2c_read_byte(i2c), Err(Error::BadHandle) | Err(Error::NotConnected) | Err(Error::NotInitialised)), "{name}");
    }
}

#[test]
fn daemon_session_scenario() {
    let ctrl = MockController::new();
    let pi = Pi::with_transport(Box::new(MockTransport::new(ctrl.clone())));

    pi.set_mode(17, Mode::Output).unwrap();
    assert_eq!(ctrl.pin_mode(17), 1);

    pi.disconnect().unwrap();
    assert!(matches!(pi.write(17, Level::High), Err(Error::NotConnected)));
}

#[test]
fn direct_initialise_failure_is_terminal() {
    let ctrl = MockController::new();
    ctrl.fail_initialise();
    assert!(matches!(
        Pi::direct(Box::new(ctrl)),
        Err(Error::InitFailed)
    ));
}

#[test]
fn concurrent_opens_get_distinct_handles() {
    for (name, pi, _) in rigs() {
        let handles = std::thread::scope(|s| {
            let workers: Vec<_> = (0..3)
                .map(|channel| {
                    let pi = &pi;
                    s.spawn(move || pi.spi_open(channel, 50_000, 0).unwrap())
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect::<Vec<_>>()
        });
        for (i, a) in handles.iter().enumerate() {
            for b in &handles[i + 1..] {
                assert_ne!(a, b, "{name}");
            }
        }
        for h in handles {
            pi.spi_close(h).unwrap();
        }
    }
}
