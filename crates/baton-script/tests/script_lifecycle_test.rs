// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use baton_script::{CooperativeScript, ScriptError, ScriptUi};
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Ticks until the script is no longer active and returns how many ticks it took.
fn tick_to_completion(script: &mut CooperativeScript, delta_time: f32, limit: u32) -> u32 {
    let mut ticks = 0;
    while script.is_active() {
        assert!(ticks < limit, "script did not finish within {} ticks", limit);
        script.tick(delta_time);
        ticks += 1;
    }
    ticks
}

#[test]
fn test_driver_and_script_never_overlap() {
    let _ = env_logger::builder().is_test(true).try_init();
    let inside = Arc::new(AtomicI32::new(0));
    let max_seen = Arc::new(AtomicI32::new(0));

    let mut script = CooperativeScript::default();
    let (i, m) = (Arc::clone(&inside), Arc::clone(&max_seen));
    script
        .start(move |s| {
            for _ in 0..200 {
                let now = i.fetch_add(1, Ordering::SeqCst) + 1;
                m.fetch_max(now, Ordering::SeqCst);
                std::hint::spin_loop();
                i.fetch_sub(1, Ordering::SeqCst);
                if !s.yield_execution() {
                    return;
                }
            }
        })
        .unwrap();

    while script.is_active() {
        script.tick(0.001);
        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
        max_seen.fetch_max(now, Ordering::SeqCst);
        std::hint::spin_loop();
        inside.fetch_sub(1, Ordering::SeqCst);
    }

    assert_eq!(max_seen.load(Ordering::SeqCst), 1);
}

#[test]
fn test_deltas_are_delivered_in_tick_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut script = CooperativeScript::default();

    let s_seen = Arc::clone(&seen);
    script
        .start(move |s| loop {
            s_seen.lock().unwrap().push(s.delta_time());
            if !s.yield_execution() {
                return;
            }
        })
        .unwrap();

    let deltas: Vec<f32> = (1..=32).map(|k| k as f32 * 0.001).collect();
    for &delta in &deltas {
        script.tick(delta);
    }
    script.stop();

    assert_eq!(*seen.lock().unwrap(), deltas);
}

#[test]
fn test_stop_makes_every_later_yield_fail() {
    let results = Arc::new(Mutex::new(Vec::new()));
    let mut script = CooperativeScript::default();

    let r = Arc::clone(&results);
    script
        .start(move |s| loop {
            let keep_going = s.yield_execution();
            r.lock().unwrap().push(keep_going);
            if !keep_going {
                // Deliberately ignores the contract for two more yields.
                let again = s.yield_execution();
                r.lock().unwrap().push(again);
                let again = s.yield_execution();
                r.lock().unwrap().push(again);
                return;
            }
        })
        .unwrap();

    script.tick(0.016);
    script.tick(0.016);
    script.stop();

    assert_eq!(*results.lock().unwrap(), vec![true, false, false, false]);
    assert!(!script.is_active());
}

#[test]
fn test_stop_interrupts_a_long_wait() {
    let outcome = Arc::new(Mutex::new(None));
    let mut script = CooperativeScript::default();

    let o = Arc::clone(&outcome);
    script
        .start(move |s| {
            *o.lock().unwrap() = Some(s.yield_for_seconds(3600.0));
        })
        .unwrap();

    for _ in 0..5 {
        script.tick(0.016);
    }
    script.stop();

    assert_eq!(*outcome.lock().unwrap(), Some(false));
}

#[test]
fn test_yield_for_seconds_waits_for_delivered_time() {
    let result = Arc::new(Mutex::new(None));
    let mut script = CooperativeScript::default();

    let r = Arc::clone(&result);
    script
        .start(move |s| {
            *r.lock().unwrap() = Some(s.yield_for_seconds(1.0));
        })
        .unwrap();

    // One tick enters the body, four resumptions of 0.25 add up to 1.0.
    let ticks = tick_to_completion(&mut script, 0.25, 100);
    assert_eq!(ticks, 5);
    assert_eq!(*result.lock().unwrap(), Some(true));
}

#[test]
fn test_yield_for_seconds_overshoots_rather_than_undershoots() {
    let result = Arc::new(Mutex::new(None));
    let mut script = CooperativeScript::default();

    let r = Arc::clone(&result);
    script
        .start(move |s| {
            *r.lock().unwrap() = Some(s.yield_for_seconds(1.0));
        })
        .unwrap();

    let ticks = tick_to_completion(&mut script, 0.3, 100);
    // 0.3 * 3 = 0.9 < 1.0, so a fourth resumption is required.
    assert_eq!(ticks, 5);
    assert_eq!(*result.lock().unwrap(), Some(true));
}

#[test]
fn test_yield_for_frames_yields_exactly_n_times() {
    for frames in [0u32, 1, 3, 17] {
        let mut script = CooperativeScript::default();
        script
            .start(move |s| {
                assert!(s.yield_for_frames(frames));
            })
            .unwrap();

        let ticks = tick_to_completion(&mut script, 0.016, 100);
        assert_eq!(ticks, frames + 1, "frames = {}", frames);
    }
}

#[test]
fn test_start_while_active_is_rejected() {
    let progress = Arc::new(AtomicU32::new(0));
    let second_ran = Arc::new(AtomicBool::new(false));
    let mut script = CooperativeScript::default();

    let p = Arc::clone(&progress);
    script
        .start(move |s| {
            for _ in 0..3 {
                p.fetch_add(1, Ordering::SeqCst);
                if !s.yield_execution() {
                    return;
                }
            }
        })
        .unwrap();
    script.tick(0.016);

    let flag = Arc::clone(&second_ran);
    let result = script.start(move |_| flag.store(true, Ordering::SeqCst));
    assert!(matches!(result, Err(ScriptError::AlreadyActive)));
    assert_eq!(script.run_count(), 1);

    let ticks = tick_to_completion(&mut script, 0.016, 10);
    assert_eq!(ticks, 3);
    assert_eq!(progress.load(Ordering::SeqCst), 3);
    assert!(!second_ran.load(Ordering::SeqCst));
}

#[test]
fn test_restart_after_stop_behaves_like_first_run() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut script = CooperativeScript::default();

    for run in 0..2 {
        let l = Arc::clone(&log);
        script
            .start(move |s| {
                l.lock()
                    .unwrap()
                    .push((run, s.is_stop_requested(), s.delta_time()));
                while s.yield_execution() {}
            })
            .unwrap();

        script.tick(0.5);
        script.tick(0.5);
        script.stop();
        assert!(!script.is_active());
    }

    assert_eq!(script.run_count(), 2);
    assert_eq!(*log.lock().unwrap(), vec![(0, false, 0.5), (1, false, 0.5)]);
}

#[test]
fn test_finished_run_can_be_restarted_without_stop() {
    let mut script = CooperativeScript::default();
    script.start(|_| {}).unwrap();
    script.tick(0.016);
    assert!(!script.is_active());

    script.start(|s| assert!(s.yield_for_frames(1))).unwrap();
    assert_eq!(tick_to_completion(&mut script, 0.016, 10), 2);
    assert_eq!(script.run_count(), 2);
}

#[test]
fn test_drop_stops_and_joins_the_script() {
    struct SetOnDrop(Arc<AtomicBool>);
    impl Drop for SetOnDrop {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    let exited = Arc::new(AtomicBool::new(false));
    {
        let mut script = CooperativeScript::default();
        let e = Arc::clone(&exited);
        script
            .start(move |s| {
                let _guard = SetOnDrop(e);
                while s.yield_execution() {}
            })
            .unwrap();
        script.tick(0.016);
        assert!(!exited.load(Ordering::SeqCst));
    }
    assert!(exited.load(Ordering::SeqCst));
}

#[derive(Default)]
struct RecordingUi {
    lines: Vec<String>,
    click: Option<String>,
}

impl ScriptUi for RecordingUi {
    fn label(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn progress(&mut self, fraction: f32, _overlay: Option<&str>) {
        self.lines.push(format!("progress {:.2}", fraction));
    }

    fn button(&mut self, label: &str) -> bool {
        self.click.as_deref() == Some(label)
    }
}

#[test]
fn test_ui_callback_runs_on_driver_while_active() {
    let clicked = Arc::new(AtomicBool::new(false));
    let mut script = CooperativeScript::default();

    let c = Arc::clone(&clicked);
    script
        .start(move |s| {
            let flag = Arc::clone(&c);
            s.set_ui_callback(move |ui: &mut dyn ScriptUi| {
                ui.label("measuring");
                ui.progress(0.5, None);
                if ui.button("Stop") {
                    flag.store(true, Ordering::SeqCst);
                }
            });
            while !c.load(Ordering::SeqCst) {
                if !s.yield_execution() {
                    return;
                }
            }
        })
        .unwrap();

    let mut ui = RecordingUi::default();
    assert!(!script.tick_ui(&mut ui), "no callback before the first slice");

    script.tick(0.016);
    assert!(script.tick_ui(&mut ui));
    assert_eq!(ui.lines, vec!["measuring", "progress 0.50"]);

    ui.click = Some("Stop".to_string());
    assert!(script.tick_ui(&mut ui));
    script.tick(0.016);
    assert!(!script.is_active());
    assert!(!script.tick_ui(&mut ui));
}

#[test]
fn test_ui_callback_can_be_cleared() {
    let mut script = CooperativeScript::default();
    script
        .start(|s| {
            s.set_ui_callback(|ui: &mut dyn ScriptUi| ui.label("busy"));
            if !s.yield_execution() {
                return;
            }
            s.clear_ui_callback();
            while s.yield_execution() {}
        })
        .unwrap();

    let mut ui = RecordingUi::default();
    script.tick(0.016);
    assert!(script.tick_ui(&mut ui));
    script.tick(0.016);
    assert!(!script.tick_ui(&mut ui));
    script.stop();
}
