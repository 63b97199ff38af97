use std::fs;
use std::path::PathBuf;

use bridge::{CommandAction, ControlCommand, EngineStatus, FileQueue};
use detection::{DetectedObject, ObjectSeverity};

use super::*;

fn temp_root(tag: &str) -> PathBuf {
    let unique = format!(
        "examguard-runtime-{tag}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default()
    );
    let dir = std::env::temp_dir().join(unique);
    fs::create_dir_all(&dir).expect("temp root");
    dir
}

fn test_config(root: &PathBuf) -> EngineConfig {
    EngineConfig {
        data_root: root.to_string_lossy().into_owned(),
        command_queue_path: root.join("commands.json").to_string_lossy().into_owned(),
        status_path: root.join("status.json").to_string_lossy().into_owned(),
        report_dir: root.join("reports").to_string_lossy().into_owned(),
        roster_path: root.join("roster.json").to_string_lossy().into_owned(),
        audio_listen_timeout_ms: 25,
        ..EngineConfig::default()
    }
}

fn dashboard(config: &EngineConfig) -> FileQueue {
    FileQueue::new(&config.command_queue_path)
}

fn start_command(student_id: &str) -> ControlCommand {
    ControlCommand {
        action: CommandAction::Start,
        student_id: Some(student_id.to_string()),
        student_name: Some("Lina".to_string()),
        exam_id: Some("E1".to_string()),
        exam_title: Some("Algorithms".to_string()),
        timestamp: Some("2026-08-07T09:00:00".to_string()),
    }
}

fn read_status(config: &EngineConfig) -> EngineStatus {
    let raw = fs::read_to_string(&config.status_path).expect("status file");
    serde_json::from_str(&raw).expect("status json")
}

fn phone_frame() -> SensorFrame {
    SensorFrame {
        objects: vec![DetectedObject {
            name: "cell phone".to_string(),
            confidence: 0.9,
            severity: ObjectSeverity::High,
            position: (10, 10, 120, 240),
        }],
        ..SensorFrame::nominal()
    }
}

async fn feed_frame(rt: &mut MonitorRuntime, frame: SensorFrame, now: f64, now_unix: i64) {
    rt.sensor_input().send(frame).await.expect("send frame");
    rt.tick(now, now_unix).await.expect("tick");
}

#[tokio::test]
async fn start_command_begins_session_and_acknowledges_queue() {
    let root = temp_root("start");
    let config = test_config(&root);
    let mut producer = dashboard(&config);
    let mut rt = MonitorRuntime::new(config.clone());

    producer.push(start_command("S1")).expect("push");
    rt.tick(0.0, 1_000).await.expect("tick");

    assert!(rt.is_running());
    assert!(rt.audio_input().is_some());
    let status = read_status(&config);
    assert!(status.dashboard_control.is_running);
    assert_eq!(status.dashboard_control.current_student.as_deref(), Some("S1"));
    assert_eq!(status.dashboard_control.exam_start_time, Some(1_000));

    // The batch was acknowledged: nothing to re-apply.
    assert!(producer.poll().expect("poll").is_empty());
    rt.tick(1.0, 1_001).await.expect("tick");
    assert!(rt.is_running());
    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn duplicate_start_in_one_batch_is_idempotent() {
    let root = temp_root("dup-start");
    let config = test_config(&root);
    let mut producer = dashboard(&config);
    let mut rt = MonitorRuntime::new(config.clone());

    producer.push(start_command("S1")).expect("push");
    producer.push(start_command("S1")).expect("push");
    rt.tick(0.0, 1_000).await.expect("tick");

    assert!(rt.is_running());
    let status = read_status(&config);
    assert_eq!(status.cheating_score, 0);
    assert_eq!(status.real_time_metrics.total_violations(), 0);
    assert_eq!(status.dashboard_control.exam_start_time, Some(1_000));
    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn face_away_below_threshold_never_alerts() {
    let root = temp_root("face-a");
    let config = test_config(&root);
    let mut producer = dashboard(&config);
    let mut rt = MonitorRuntime::new(config.clone());
    producer.push(start_command("S1")).expect("push");
    rt.tick(0.0, 1_000).await.expect("tick");

    let away = SensorFrame {
        face_present: Some(false),
        ..SensorFrame::nominal()
    };
    feed_frame(&mut rt, away.clone(), 1.0, 1_001).await;
    feed_frame(&mut rt, away, 4.0, 1_004).await;
    // Condition drops after 3.0s of hold: no event, no score.
    feed_frame(&mut rt, SensorFrame::nominal(), 4.5, 1_004).await;

    assert_eq!(read_status(&config).cheating_score, 0);
    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn face_away_past_threshold_alerts_exactly_once() {
    let root = temp_root("face-b");
    let config = test_config(&root);
    let mut producer = dashboard(&config);
    let mut rt = MonitorRuntime::new(config.clone());
    producer.push(start_command("S1")).expect("push");
    rt.tick(0.0, 1_000).await.expect("tick");

    let away = SensorFrame {
        face_present: Some(false),
        ..SensorFrame::nominal()
    };
    feed_frame(&mut rt, away.clone(), 5.0, 1_005).await;
    // Held continuously for 5.1s: exactly one face_away alert.
    feed_frame(&mut rt, away.clone(), 10.1, 1_010).await;
    assert_eq!(read_status(&config).cheating_score, 10);

    // Still away: the timer re-arms but must not re-fire yet.
    feed_frame(&mut rt, away.clone(), 10.5, 1_010).await;
    feed_frame(&mut rt, away, 14.0, 1_014).await;
    assert_eq!(read_status(&config).cheating_score, 10);
    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn object_cascade_reaches_termination_and_writes_report() {
    let root = temp_root("cascade");
    let config = test_config(&root);
    let mut producer = dashboard(&config);
    let mut rt = MonitorRuntime::new(config.clone());
    producer.push(start_command("S1")).expect("push");
    rt.tick(0.0, 1_000).await.expect("tick");

    // Four forbidden-object alerts spaced past the cooldown: 25 each.
    for i in 0..4 {
        let now = 1.0 + i as f64 * 6.0;
        feed_frame(&mut rt, phone_frame(), now, 1_001 + i as i64 * 6).await;
    }
    let status = read_status(&config);
    assert_eq!(status.cheating_score, 100);
    assert!(status.exam_termination.countdown.is_some());
    assert!(!status.exam_termination.terminated);

    // Countdown expires (default 10s): session terminates, report lands.
    rt.tick(40.0, 1_040).await.expect("tick");
    let status = read_status(&config);
    assert!(status.exam_termination.terminated);
    assert!(!status.dashboard_control.is_running);
    assert!(!rt.is_running());

    let reports: Vec<_> = fs::read_dir(&config.report_dir)
        .expect("report dir")
        .collect();
    assert_eq!(reports.len(), 1);

    // Terminated is absorbing: further detections change nothing.
    feed_frame(&mut rt, phone_frame(), 50.0, 1_050).await;
    assert_eq!(read_status(&config).cheating_score, 100);
    assert_eq!(read_status(&config).incidents_count, 4);
    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn stop_reports_and_state_survives_until_next_start() {
    let root = temp_root("stop");
    let config = test_config(&root);
    let mut producer = dashboard(&config);
    let mut rt = MonitorRuntime::new(config.clone());
    producer.push(start_command("S1")).expect("push");
    rt.tick(0.0, 1_000).await.expect("tick");

    feed_frame(&mut rt, phone_frame(), 1.0, 1_001).await;
    assert_eq!(read_status(&config).cheating_score, 25);

    producer.push(ControlCommand::stop()).expect("push");
    rt.tick(10.0, 1_010).await.expect("tick");
    assert!(!rt.is_running());
    assert!(rt.audio_input().is_none());
    // Score remains visible after stop; reset happens on the next start.
    let status = read_status(&config);
    assert_eq!(status.cheating_score, 25);
    assert!(!status.dashboard_control.is_running);
    assert_eq!(
        fs::read_dir(&config.report_dir).expect("report dir").count(),
        1
    );

    producer.push(start_command("S2")).expect("push");
    rt.tick(20.0, 1_020).await.expect("tick");
    let status = read_status(&config);
    assert!(status.dashboard_control.is_running);
    assert_eq!(status.cheating_score, 0);
    assert_eq!(status.incidents_count, 0);
    assert_eq!(status.dashboard_control.current_student.as_deref(), Some("S2"));
    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn stop_then_start_in_one_batch_keeps_the_start() {
    let root = temp_root("stop-start");
    let config = test_config(&root);
    let mut producer = dashboard(&config);
    let mut rt = MonitorRuntime::new(config.clone());
    producer.push(start_command("S1")).expect("push");
    rt.tick(0.0, 1_000).await.expect("tick");

    producer.push(ControlCommand::stop()).expect("push");
    producer.push(start_command("S2")).expect("push");
    rt.tick(5.0, 1_005).await.expect("tick");

    assert!(rt.is_running());
    let status = read_status(&config);
    assert_eq!(status.dashboard_control.current_student.as_deref(), Some("S2"));
    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn roster_commands_mutate_roster_only() {
    let root = temp_root("roster");
    let config = test_config(&root);
    let mut producer = dashboard(&config);
    let mut rt = MonitorRuntime::new(config.clone());

    producer
        .push(ControlCommand {
            action: CommandAction::AddStudent,
            student_id: Some("S9".to_string()),
            student_name: Some("Omar".to_string()),
            exam_id: None,
            exam_title: None,
            timestamp: None,
        })
        .expect("push");
    rt.tick(0.0, 1_000).await.expect("tick");
    assert_eq!(rt.roster.student_name("S9"), Some("Omar"));
    assert!(!rt.is_running());
    assert_eq!(read_status(&config).cheating_score, 0);

    producer
        .push(ControlCommand {
            action: CommandAction::RemoveStudent,
            student_id: Some("S9".to_string()),
            student_name: None,
            exam_id: None,
            exam_title: None,
            timestamp: None,
        })
        .expect("push");
    rt.tick(1.0, 1_001).await.expect("tick");
    assert!(rt.roster.is_empty());
    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn malformed_queue_is_discarded_without_stalling() {
    let root = temp_root("corrupt");
    let config = test_config(&root);
    fs::write(&config.command_queue_path, "][ nonsense").expect("seed corrupt queue");
    let mut rt = MonitorRuntime::new(config.clone());

    rt.tick(0.0, 1_000).await.expect("tick");
    assert!(!rt.is_running());

    // The queue works again after the reset.
    let mut producer = dashboard(&config);
    producer.push(start_command("S1")).expect("push");
    rt.tick(1.0, 1_001).await.expect("tick");
    assert!(rt.is_running());
    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn failed_detector_contributes_no_signal() {
    let root = temp_root("degraded");
    let config = test_config(&root);
    let mut producer = dashboard(&config);
    let mut rt = MonitorRuntime::new(config.clone());
    producer.push(start_command("S1")).expect("push");
    rt.tick(0.0, 1_000).await.expect("tick");

    // Face detector down for 20s: None readings never arm the timer.
    let degraded = SensorFrame {
        face_present: None,
        ..SensorFrame::nominal()
    };
    for i in 0..5 {
        feed_frame(&mut rt, degraded.clone(), 1.0 + i as f64 * 4.0, 1_001).await;
    }
    assert_eq!(read_status(&config).cheating_score, 0);
    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn audio_alerts_land_while_video_ticks_run() {
    let root = temp_root("audio");
    let config = test_config(&root);
    let mut producer = dashboard(&config);
    let mut rt = MonitorRuntime::new(config.clone());
    producer.push(start_command("S1")).expect("push");
    rt.tick(0.0, 1_000).await.expect("tick");

    let audio = rt.audio_input().expect("audio input");
    // Four loud low-frequency chunks cross the talking count threshold.
    for i in 0..4 {
        audio
            .send(AudioFeatures {
                rms: 1500.0,
                zero_crossings: 200.0,
                speech_detected: false,
                timestamp: 1.0 + i as f64,
            })
            .await
            .expect("send audio");
    }
    // Give the listener a few cycles to drain the channel.
    tokio::time::sleep(Duration::from_millis(120)).await;
    rt.tick(6.0, 1_006).await.expect("tick");

    let status = read_status(&config);
    assert_eq!(status.cheating_score, 20);
    assert_eq!(status.real_time_metrics.audio_violations, 1);
    let _ = fs::remove_dir_all(root);
}
