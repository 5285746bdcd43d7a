use std::time::Duration;

use instant::Instant;
use scene_ngin::flow::{Clock, FrameDriver, FrameStatus, StopSignal};

use crate::common::test_utils::FrameLog;
mod common;

#[test]
fn update_runs_before_draw_every_frame() {
    let mut driver = FrameDriver::new(StopSignal::new());
    let mut log = FrameLog::new();
    for _ in 0..5 {
        let status = driver
            .frame(
                &mut log,
                |log, time| log.update(time.frame),
                |log| -> Result<(), ()> {
                    let frame = log.events().len() as u64 / 2;
                    log.draw(frame);
                    Ok(())
                },
            )
            .unwrap();
        assert!(matches!(status, FrameStatus::Drawn(_)));
    }
    let expected: Vec<String> = (0..5)
        .flat_map(|k| [format!("update {k}"), format!("draw {k}")])
        .collect();
    assert_eq!(log.events(), expected.as_slice());
}

#[test]
fn stop_signal_ends_the_loop_before_the_next_update() {
    let stop = StopSignal::new();
    let mut driver = FrameDriver::new(stop.clone());
    let mut log = FrameLog::new();
    let frame = |driver: &mut FrameDriver, log: &mut FrameLog| {
        driver
            .frame(log, |log, time| log.update(time.frame), |_| Ok::<(), ()>(()))
            .unwrap()
    };

    assert!(matches!(frame(&mut driver, &mut log), FrameStatus::Drawn(_)));
    stop.raise();
    assert!(driver.stop_signal().is_raised());
    assert_eq!(frame(&mut driver, &mut log), FrameStatus::Stopped);
    assert_eq!(frame(&mut driver, &mut log), FrameStatus::Stopped);
    assert_eq!(log.events(), ["update 0".to_string()]);
}

#[test]
fn draw_errors_are_passed_through() {
    let mut driver = FrameDriver::new(StopSignal::new());
    let mut updates = 0;
    let result = driver.frame(&mut updates, |n, _| *n += 1, |_| Err("lost"));
    assert_eq!(result, Err("lost"));
    assert_eq!(updates, 1);
}

#[test]
fn clock_reports_elapsed_and_delta() {
    let start = Instant::now();
    let mut clock = Clock::starting_at(start);

    let first = clock.tick_at(start + Duration::from_millis(16));
    assert_eq!(first.frame, 0);
    assert_eq!(first.elapsed, Duration::from_millis(16));
    assert_eq!(first.delta, Duration::from_millis(16));

    let second = clock.tick_at(start + Duration::from_millis(40));
    assert_eq!(second.frame, 1);
    assert_eq!(second.elapsed, Duration::from_millis(40));
    assert_eq!(second.delta, Duration::from_millis(24));
    assert!((second.elapsed_secs() - 0.04).abs() < 1e-6);
}

#[test]
fn clock_never_runs_backwards() {
    let start = Instant::now();
    let mut clock = Clock::starting_at(start);
    clock.tick_at(start + Duration::from_millis(50));
    let late = clock.tick_at(start + Duration::from_millis(10));
    assert_eq!(late.elapsed, Duration::from_millis(50));
    assert_eq!(late.delta, Duration::ZERO);
}

#[test]
fn driver_uses_the_given_clock() {
    let start = Instant::now() - Duration::from_secs(10);
    let mut driver = FrameDriver::with_clock(Clock::starting_at(start), StopSignal::new());
    let mut elapsed = Duration::ZERO;
    driver
        .frame(&mut elapsed, |e, time| *e = time.elapsed, |_| Ok::<(), ()>(()))
        .unwrap();
    assert!(elapsed >= Duration::from_secs(10));
}
