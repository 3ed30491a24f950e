use std::thread;
use std::time::{Duration, Instant};

use robosim::geometry::{LineSegment, Obstacle, Vec2};
use robosim::kinematics::Pose;
use robosim::{Scene, SimConfig, SimOutcome, Simulator};

fn wall(x1: f64, y1: f64, x2: f64, y2: f64) -> Obstacle {
    LineSegment::new(Vec2::new(x1, y1), Vec2::new(x2, y2))
        .unwrap()
        .into()
}

fn open_scene() -> Scene {
    Scene {
        pose: Pose::new(0.0, 0.0, 0.0),
        robot_length: 0.2,
        obstacles: vec![wall(50.0, -1.0, 50.0, 1.0)],
    }
}

fn fast_config(seed: u64) -> SimConfig {
    SimConfig {
        tick_ms: 1,
        seed,
        ..SimConfig::default()
    }
}

/// Polls `condition` until it holds or `timeout` passes.
fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

#[test]
fn threaded_simulator_stops_on_request() {
    let handle = Simulator::new(open_scene(), fast_config(1))
        .unwrap()
        .start()
        .unwrap();
    let link = handle.link();
    link.send_control(0.5, 0.0);

    assert!(wait_for(Duration::from_secs(5), || link.odometry().tick >= 50));
    assert!(link.is_running());
    assert!(!handle.is_finished());
    assert!(link.current_control().v > 0.0);
    assert!(link.ground_truth().pose.x > 0.0);
    assert!(link.laser_scan().timestamp_ms > 0);

    handle.stop();
    match handle.join().unwrap() {
        SimOutcome::Stopped { tick } => assert!(tick >= 50),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(!link.is_running());
}

#[test]
fn threaded_simulator_reports_crash() {
    let scene = Scene {
        pose: Pose::new(0.0, 0.0, 0.0),
        robot_length: 0.2,
        obstacles: vec![wall(0.5, -1.0, 0.5, 1.0)],
    };
    let handle = Simulator::new(scene, fast_config(2)).unwrap().start().unwrap();
    let link = handle.link();
    link.send_control(1.0, 0.0);

    let outcome = handle.join().unwrap();
    let SimOutcome::Crashed { tick, pose } = outcome else {
        panic!("unexpected outcome {outcome:?}");
    };
    assert!(pose.x > 0.25);
    assert!(!link.is_running());

    let truth = link.ground_truth();
    assert_eq!(truth.pose, pose);
    assert_eq!(truth.tick, tick);

    // Nothing is republished after the crash.
    let scan = link.laser_scan();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(link.laser_scan(), scan);
    assert_eq!(link.ground_truth(), truth);
}

#[test]
fn dropping_the_handle_stops_the_loop() {
    let handle = Simulator::new(open_scene(), fast_config(3))
        .unwrap()
        .start()
        .unwrap();
    let link = handle.link();
    assert!(wait_for(Duration::from_secs(5), || link.odometry().tick >= 5));

    drop(handle);
    assert!(wait_for(Duration::from_secs(5), || !link.is_running()));
}

#[test]
fn simulators_are_independent() {
    let a = Simulator::new(open_scene(), fast_config(4)).unwrap().start().unwrap();
    let b = Simulator::new(open_scene(), fast_config(5)).unwrap().start().unwrap();
    let (link_a, link_b) = (a.link(), b.link());

    link_a.send_control(1.0, 0.0);
    assert!(wait_for(Duration::from_secs(5), || link_a.ground_truth().pose.x > 0.05));
    assert!(wait_for(Duration::from_secs(5), || link_b.odometry().tick >= 10));

    assert!(link_b.goal_control().is_zero());
    assert_eq!(link_b.ground_truth().pose, Pose::new(0.0, 0.0, 0.0));

    a.stop();
    b.stop();
    assert!(matches!(a.join().unwrap(), SimOutcome::Stopped { .. }));
    assert!(matches!(b.join().unwrap(), SimOutcome::Stopped { .. }));
}
