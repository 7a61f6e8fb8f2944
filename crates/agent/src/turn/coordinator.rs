//! Turn-taking state machine
//!
//! Pure and synchronous: every event yields the next coordinator and an
//! ordered list of [`Effect`]s. Nothing here touches an engine, a timer or
//! the network; the runtime executes the effects and feeds engine callbacks
//! back in as events.
//!
//! Capture and synthesis are never active at the same time. Every path that
//! starts capture cancels synthesis first, and every path that starts
//! synthesis stops capture first.

use std::time::Duration;

use jinny_config::TurnConfig;

use super::state::{Effect, TurnEvent, TurnState};

/// Silent watchdog ticks tolerated before a reply that never started is abandoned
pub const UNCONFIRMED_SPEECH_TICKS: u32 = 5;

/// Timer settings used by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnTimings {
    /// Silence after the last interim result before auto-submit (live mode)
    pub silence_threshold: Duration,
    /// Debounce before capture restarts after synthesis
    pub restart_delay: Duration,
    /// Synthesis watchdog period
    pub watchdog_interval: Duration,
}

impl Default for TurnTimings {
    fn default() -> Self {
        Self::from(&TurnConfig::default())
    }
}

impl From<&TurnConfig> for TurnTimings {
    fn from(config: &TurnConfig) -> Self {
        Self {
            silence_threshold: Duration::from_millis(config.silence_threshold_ms),
            restart_delay: Duration::from_millis(config.restart_delay_ms),
            watchdog_interval: Duration::from_millis(config.watchdog_interval_ms),
        }
    }
}

/// Turn-taking coordinator
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinator {
    state: TurnState,
    live: bool,
    /// Live continuation disabled until the user explicitly starts again
    suppressed: bool,
    capture_active: bool,
    synthesis_active: bool,
    /// The engine has reported audio for the current reply
    synthesis_confirmed: bool,
    /// Silent watchdog ticks seen while waiting for that confirmation
    unconfirmed_ticks: u32,
    restart_pending: bool,
    /// Latest interim revision
    interim: String,
    silence_generation: u64,
    restart_generation: u64,
    timings: TurnTimings,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(TurnTimings::default())
    }
}

/// Pure transition function
pub fn transition(coordinator: &Coordinator, event: TurnEvent) -> (Coordinator, Vec<Effect>) {
    let mut next = coordinator.clone();
    let effects = next.handle(event);
    (next, effects)
}

impl Coordinator {
    pub fn new(timings: TurnTimings) -> Self {
        Self {
            state: TurnState::Idle,
            live: false,
            suppressed: false,
            capture_active: false,
            synthesis_active: false,
            synthesis_confirmed: false,
            unconfirmed_ticks: 0,
            restart_pending: false,
            interim: String::new(),
            silence_generation: 0,
            restart_generation: 0,
            timings,
        }
    }

    /// Internal state; never `LiveActive`
    pub fn state(&self) -> TurnState {
        self.state
    }

    /// State as reported to observers
    pub fn display_state(&self) -> TurnState {
        if self.state == TurnState::Listening && self.live {
            TurnState::LiveActive
        } else {
            self.state
        }
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn capture_active(&self) -> bool {
        self.capture_active
    }

    pub fn synthesis_active(&self) -> bool {
        self.synthesis_active
    }

    pub fn restart_pending(&self) -> bool {
        self.restart_pending
    }

    pub fn interim(&self) -> &str {
        &self.interim
    }

    pub fn timings(&self) -> &TurnTimings {
        &self.timings
    }

    /// Apply one event and return the effects to execute, in order
    pub fn handle(&mut self, event: TurnEvent) -> Vec<Effect> {
        let mut fx = Vec::new();

        match event {
            TurnEvent::StartCapture => {
                if self.state != TurnState::Processing {
                    self.suppressed = false;
                    self.cancel_restart();
                    self.begin_listening(&mut fx);
                }
            },
            TurnEvent::ReleaseCapture => {
                // The recognizer delivers its last result and then ends
                if self.state == TurnState::Listening && !self.live {
                    self.stop_capture(&mut fx);
                }
            },
            TurnEvent::SetLiveMode(true) => {
                self.live = true;
                self.suppressed = false;
                if self.state == TurnState::Idle {
                    self.begin_listening(&mut fx);
                }
            },
            TurnEvent::SetLiveMode(false) => {
                self.live = false;
                self.cancel_restart();
                self.silence_generation += 1;
                if self.state == TurnState::Listening {
                    self.stop_capture(&mut fx);
                    self.state = TurnState::Idle;
                    self.interim.clear();
                }
            },
            TurnEvent::Stop | TurnEvent::VisibilityHidden | TurnEvent::Unload => {
                self.halt(&mut fx);
            },
            TurnEvent::Pause => {
                if self.state == TurnState::Speaking {
                    fx.push(Effect::PauseSpeech);
                    self.state = TurnState::Paused;
                }
            },
            TurnEvent::Resume => {
                if self.state == TurnState::Paused {
                    fx.push(Effect::ResumeSpeech);
                    self.state = TurnState::Speaking;
                }
            },
            TurnEvent::RecognizerStarted => {
                if self.state == TurnState::Listening {
                    self.capture_active = true;
                } else {
                    // Started after we moved on
                    fx.push(Effect::StopCapture);
                    self.capture_active = false;
                }
            },
            TurnEvent::RecognizerResult { final_text, interim } => {
                self.on_result(final_text, interim, &mut fx);
            },
            TurnEvent::RecognizerEnded => self.on_recognizer_ended(&mut fx),
            TurnEvent::RecognizerError(kind) => {
                if !kind.is_transient() {
                    fx.push(Effect::ShowError {
                        message: kind.message(),
                    });
                    self.stop_capture(&mut fx);
                    self.cancel_restart();
                    self.silence_generation += 1;
                    if self.state == TurnState::Listening {
                        self.state = TurnState::Idle;
                        self.interim.clear();
                    }
                    self.suppressed = true;
                }
            },
            TurnEvent::SilenceElapsed { generation } => {
                if generation == self.silence_generation && self.state == TurnState::Listening {
                    if let Some(text) = self.pending_interim() {
                        self.submit(text, String::new(), &mut fx);
                    }
                }
            },
            TurnEvent::CompletionReceived { text } => self.on_completion(text, &mut fx),
            TurnEvent::RelayError { message } => {
                fx.push(Effect::ShowError { message });
                if self.state == TurnState::Processing {
                    self.stop_capture(&mut fx);
                    self.finish_turn(&mut fx);
                }
            },
            TurnEvent::SynthesisStarted => {
                if self.is_speaking_state() {
                    self.synthesis_confirmed = true;
                } else {
                    fx.push(Effect::CancelSpeech);
                    self.synthesis_active = false;
                }
            },
            TurnEvent::SynthesisEnded | TurnEvent::SynthesisFailed => {
                if self.is_speaking_state() {
                    self.finish_turn(&mut fx);
                } else {
                    self.synthesis_active = false;
                }
            },
            TurnEvent::RestartElapsed { generation } => {
                if self.restart_pending
                    && generation == self.restart_generation
                    && self.state == TurnState::Listening
                {
                    self.restart_pending = false;
                    self.begin_listening(&mut fx);
                }
            },
            TurnEvent::WatchdogTick { engine_speaking } => {
                match (self.state, engine_speaking) {
                    // Engine went quiet without telling us
                    (TurnState::Speaking, false) if self.synthesis_confirmed => {
                        self.finish_turn(&mut fx)
                    },
                    // Audio may not have started yet
                    (TurnState::Speaking, false) => {
                        self.unconfirmed_ticks += 1;
                        if self.unconfirmed_ticks >= UNCONFIRMED_SPEECH_TICKS {
                            self.finish_turn(&mut fx);
                        }
                    },
                    (TurnState::Speaking, true) => self.synthesis_confirmed = true,
                    (TurnState::Paused, _) => {},
                    (_, true) => {
                        fx.push(Effect::CancelSpeech);
                        self.synthesis_active = false;
                    },
                    (_, false) => {},
                }
            },
        }

        debug_assert!(!(self.capture_active && self.synthesis_active));
        fx
    }

    fn is_speaking_state(&self) -> bool {
        matches!(self.state, TurnState::Speaking | TurnState::Paused)
    }

    fn pending_interim(&self) -> Option<String> {
        let text = self.interim.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    fn begin_listening(&mut self, fx: &mut Vec<Effect>) {
        self.cancel_speech(fx);
        if !self.capture_active {
            fx.push(Effect::StartCapture);
            self.capture_active = true;
        }
        if self.state != TurnState::Listening {
            self.interim.clear();
        }
        self.state = TurnState::Listening;
    }

    fn stop_capture(&mut self, fx: &mut Vec<Effect>) {
        if self.capture_active {
            fx.push(Effect::StopCapture);
            self.capture_active = false;
        }
    }

    fn cancel_speech(&mut self, fx: &mut Vec<Effect>) {
        if self.synthesis_active {
            fx.push(Effect::CancelSpeech);
            self.synthesis_active = false;
        }
    }

    fn cancel_restart(&mut self) {
        self.restart_pending = false;
        self.restart_generation += 1;
    }

    fn halt(&mut self, fx: &mut Vec<Effect>) {
        self.cancel_speech(fx);
        self.stop_capture(fx);
        self.cancel_restart();
        self.silence_generation += 1;
        self.interim.clear();
        self.suppressed = true;
        self.state = TurnState::Idle;
    }

    fn submit(&mut self, final_text: String, interim: String, fx: &mut Vec<Effect>) {
        self.silence_generation += 1;
        self.interim.clear();
        self.state = TurnState::Processing;
        fx.push(Effect::SendTranscript {
            final_text: final_text.clone(),
            interim: interim.clone(),
        });
        fx.push(Effect::ShowTranscript { final_text, interim });
    }

    fn on_result(&mut self, final_text: String, interim: String, fx: &mut Vec<Effect>) {
        if self.state != TurnState::Listening {
            return;
        }

        let trimmed = final_text.trim();
        if !trimmed.is_empty() {
            self.submit(trimmed.to_string(), interim, fx);
            return;
        }

        if interim.trim().is_empty() {
            return;
        }

        self.interim = interim.clone();
        fx.push(Effect::ShowTranscript {
            final_text: String::new(),
            interim,
        });
        if self.live {
            self.silence_generation += 1;
            fx.push(Effect::ArmSilenceTimer {
                generation: self.silence_generation,
                after: self.timings.silence_threshold,
            });
        }
    }

    fn on_recognizer_ended(&mut self, fx: &mut Vec<Effect>) {
        self.capture_active = false;
        if self.state != TurnState::Listening {
            return;
        }

        if self.live && !self.suppressed {
            if !self.restart_pending {
                fx.push(Effect::StartCapture);
                self.capture_active = true;
            }
        } else if let Some(text) = self.pending_interim() {
            self.submit(text, String::new(), fx);
        } else {
            self.interim.clear();
            self.state = TurnState::Idle;
        }
    }

    fn on_completion(&mut self, text: String, fx: &mut Vec<Effect>) {
        if self.state != TurnState::Processing {
            fx.push(Effect::ShowResponse { text });
            return;
        }

        self.stop_capture(fx);
        fx.push(Effect::ShowResponse { text: text.clone() });

        if text.trim().is_empty() {
            self.finish_turn(fx);
        } else {
            fx.push(Effect::Speak { text });
            self.synthesis_active = true;
            self.synthesis_confirmed = false;
            self.unconfirmed_ticks = 0;
            self.state = TurnState::Speaking;
        }
    }

    /// Resume rule after a reply has been spoken (or could not be)
    fn finish_turn(&mut self, fx: &mut Vec<Effect>) {
        self.synthesis_active = false;
        self.synthesis_confirmed = false;
        self.interim.clear();
        if self.live && !self.suppressed {
            self.state = TurnState::Listening;
            self.restart_generation += 1;
            self.restart_pending = true;
            fx.push(Effect::ScheduleRestart {
                generation: self.restart_generation,
                after: self.timings.restart_delay,
            });
        } else {
            self.state = TurnState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::state::RecognizerErrorKind;

    fn result(final_text: &str, interim: &str) -> TurnEvent {
        TurnEvent::RecognizerResult {
            final_text: final_text.to_string(),
            interim: interim.to_string(),
        }
    }

    fn completion(text: &str) -> TurnEvent {
        TurnEvent::CompletionReceived {
            text: text.to_string(),
        }
    }

    fn speaking() -> Coordinator {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::StartCapture);
        c.handle(TurnEvent::RecognizerStarted);
        c.handle(result("what's up", ""));
        c.handle(completion("Not much."));
        assert_eq!(c.state(), TurnState::Speaking);
        c
    }

    #[test]
    fn test_push_to_talk_round_trip() {
        let mut c = Coordinator::default();
        assert_eq!(c.handle(TurnEvent::StartCapture), vec![Effect::StartCapture]);
        assert_eq!(c.state(), TurnState::Listening);

        let fx = c.handle(result("  hello there ", ""));
        assert_eq!(
            fx,
            vec![
                Effect::SendTranscript {
                    final_text: "hello there".to_string(),
                    interim: String::new()
                },
                Effect::ShowTranscript {
                    final_text: "hello there".to_string(),
                    interim: String::new()
                },
            ]
        );
        assert_eq!(c.state(), TurnState::Processing);

        let fx = c.handle(completion("Hi!"));
        let stop = fx.iter().position(|e| *e == Effect::StopCapture).unwrap();
        let speak = fx
            .iter()
            .position(|e| matches!(e, Effect::Speak { .. }))
            .unwrap();
        assert!(stop < speak);
        assert_eq!(c.state(), TurnState::Speaking);
        assert!(!c.capture_active());

        assert!(c.handle(TurnEvent::SynthesisEnded).is_empty());
        assert_eq!(c.state(), TurnState::Idle);
    }

    #[test]
    fn test_empty_final_is_ignored() {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::StartCapture);
        assert!(c.handle(result("   ", "")).is_empty());
        assert_eq!(c.state(), TurnState::Listening);
    }

    #[test]
    fn test_interim_only_shows() {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::StartCapture);
        let fx = c.handle(result("", "hel"));
        assert_eq!(
            fx,
            vec![Effect::ShowTranscript {
                final_text: String::new(),
                interim: "hel".to_string()
            }]
        );
        assert_eq!(c.interim(), "hel");
    }

    #[test]
    fn test_release_submits_latest_interim_on_end() {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::StartCapture);
        c.handle(result("", "turn on"));
        c.handle(result("", "turn on the lights"));

        assert_eq!(c.handle(TurnEvent::ReleaseCapture), vec![Effect::StopCapture]);
        let fx = c.handle(TurnEvent::RecognizerEnded);
        assert!(matches!(
            &fx[0],
            Effect::SendTranscript { final_text, .. } if final_text == "turn on the lights"
        ));
        assert_eq!(c.state(), TurnState::Processing);
    }

    #[test]
    fn test_end_without_speech_goes_idle() {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::StartCapture);
        assert!(c.handle(TurnEvent::RecognizerEnded).is_empty());
        assert_eq!(c.state(), TurnState::Idle);
    }

    #[test]
    fn test_start_capture_ignored_while_processing() {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::StartCapture);
        c.handle(result("question", ""));
        assert!(c.handle(TurnEvent::StartCapture).is_empty());
        assert_eq!(c.state(), TurnState::Processing);
    }

    #[test]
    fn test_barge_in_cancels_before_capture() {
        let mut c = speaking();
        let fx = c.handle(TurnEvent::StartCapture);
        assert_eq!(fx, vec![Effect::CancelSpeech, Effect::StartCapture]);
        assert_eq!(c.state(), TurnState::Listening);

        let mut c = speaking();
        c.handle(TurnEvent::Pause);
        let fx = c.handle(TurnEvent::StartCapture);
        assert_eq!(fx, vec![Effect::CancelSpeech, Effect::StartCapture]);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut c = speaking();
        assert_eq!(c.handle(TurnEvent::Pause), vec![Effect::PauseSpeech]);
        assert_eq!(c.state(), TurnState::Paused);
        assert_eq!(c.handle(TurnEvent::Resume), vec![Effect::ResumeSpeech]);
        assert_eq!(c.state(), TurnState::Speaking);
        // Resume outside Paused does nothing
        assert!(c.handle(TurnEvent::Resume).is_empty());
    }

    #[test]
    fn test_halt_from_every_state() {
        let mut states = Vec::new();
        states.push(Coordinator::default());

        let mut listening = Coordinator::default();
        listening.handle(TurnEvent::SetLiveMode(true));
        states.push(listening.clone());

        let mut processing = listening.clone();
        processing.handle(result("hi", ""));
        states.push(processing);

        let s = speaking();
        let mut paused = s.clone();
        paused.handle(TurnEvent::Pause);
        states.push(s);
        states.push(paused);

        for halt in [TurnEvent::Stop, TurnEvent::VisibilityHidden, TurnEvent::Unload] {
            for start in &states {
                let (next, fx) = transition(start, halt.clone());
                assert_eq!(next.state(), TurnState::Idle);
                assert!(!next.capture_active());
                assert!(!next.synthesis_active());
                assert!(next.is_suppressed());
                if start.synthesis_active() {
                    assert!(fx.contains(&Effect::CancelSpeech));
                }
                if start.capture_active() {
                    assert!(fx.contains(&Effect::StopCapture));
                }
            }
        }
    }

    #[test]
    fn test_stale_completion_only_displays() {
        let mut c = Coordinator::default();
        let fx = c.handle(completion("late reply"));
        assert_eq!(
            fx,
            vec![Effect::ShowResponse {
                text: "late reply".to_string()
            }]
        );
        assert_eq!(c.state(), TurnState::Idle);
    }

    #[test]
    fn test_empty_completion_ends_turn() {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::StartCapture);
        c.handle(result("hi", ""));
        let fx = c.handle(completion(""));
        assert!(!fx.iter().any(|e| matches!(e, Effect::Speak { .. })));
        assert_eq!(c.state(), TurnState::Idle);
    }

    #[test]
    fn test_relay_error_resumes() {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::SetLiveMode(true));
        c.handle(result("hi", ""));
        let fx = c.handle(TurnEvent::RelayError {
            message: "Rate limit exceeded".to_string(),
        });
        assert!(matches!(fx[0], Effect::ShowError { .. }));
        assert!(fx.iter().any(|e| matches!(e, Effect::ScheduleRestart { .. })));
        assert_eq!(c.display_state(), TurnState::LiveActive);
    }

    #[test]
    fn test_live_restart_after_synthesis() {
        let mut c = Coordinator::default();
        assert_eq!(c.handle(TurnEvent::SetLiveMode(true)), vec![Effect::StartCapture]);
        assert_eq!(c.display_state(), TurnState::LiveActive);

        c.handle(result("tell me a joke", ""));
        c.handle(completion("Why did the chicken cross the road?"));

        let fx = c.handle(TurnEvent::SynthesisEnded);
        let Some(Effect::ScheduleRestart { generation, after }) = fx.first().cloned() else {
            panic!("expected restart, got {:?}", fx);
        };
        assert_eq!(after, Duration::from_millis(300));
        assert_eq!(c.state(), TurnState::Listening);
        assert!(!c.capture_active());

        // Stale generation is ignored
        assert!(c.handle(TurnEvent::RestartElapsed { generation: generation - 1 }).is_empty());
        assert_eq!(
            c.handle(TurnEvent::RestartElapsed { generation }),
            vec![Effect::StartCapture]
        );
        assert!(c.capture_active());
    }

    #[test]
    fn test_late_recognizer_end_does_not_skip_debounce() {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::SetLiveMode(true));
        c.handle(result("hi", ""));
        c.handle(completion("hello"));
        c.handle(TurnEvent::SynthesisEnded);
        assert!(c.handle(TurnEvent::RecognizerEnded).is_empty());
        assert!(c.restart_pending());
    }

    #[test]
    fn test_live_recognizer_end_restarts() {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::SetLiveMode(true));
        c.handle(TurnEvent::RecognizerStarted);
        assert_eq!(c.handle(TurnEvent::RecognizerEnded), vec![Effect::StartCapture]);
        assert_eq!(c.display_state(), TurnState::LiveActive);
    }

    #[test]
    fn test_stop_suppresses_live_continuation() {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::SetLiveMode(true));
        c.handle(TurnEvent::Stop);
        assert!(c.is_live());
        assert!(c.handle(TurnEvent::RecognizerEnded).is_empty());
        assert_eq!(c.state(), TurnState::Idle);

        // Explicit start clears suppression
        c.handle(TurnEvent::StartCapture);
        assert_eq!(c.handle(TurnEvent::RecognizerEnded), vec![Effect::StartCapture]);
    }

    #[test]
    fn test_silence_auto_submit() {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::SetLiveMode(true));

        let fx = c.handle(result("", "what time"));
        let Some(Effect::ArmSilenceTimer { generation: first, after }) = fx.last().cloned() else {
            panic!("expected silence timer");
        };
        assert_eq!(after, Duration::from_millis(1500));

        let fx = c.handle(result("", "what time is it"));
        let Some(Effect::ArmSilenceTimer { generation: second, .. }) = fx.last().cloned() else {
            panic!("expected silence timer");
        };

        // The first timer was superseded by the newer revision
        assert!(c.handle(TurnEvent::SilenceElapsed { generation: first }).is_empty());

        let fx = c.handle(TurnEvent::SilenceElapsed { generation: second });
        assert_eq!(
            fx[0],
            Effect::SendTranscript {
                final_text: "what time is it".to_string(),
                interim: String::new()
            }
        );
        assert_eq!(c.state(), TurnState::Processing);
    }

    #[test]
    fn test_no_silence_timer_outside_live_mode() {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::StartCapture);
        let fx = c.handle(result("", "hmm"));
        assert!(!fx.iter().any(|e| matches!(e, Effect::ArmSilenceTimer { .. })));
    }

    #[test]
    fn test_transient_recognizer_errors_swallowed() {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::SetLiveMode(true));
        let fx = c.handle(TurnEvent::RecognizerError(RecognizerErrorKind::NoSpeech));
        assert!(fx.is_empty());
        assert_eq!(c.display_state(), TurnState::LiveActive);
    }

    #[test]
    fn test_fatal_recognizer_error_degrades_to_idle() {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::SetLiveMode(true));
        let fx = c.handle(TurnEvent::RecognizerError(RecognizerErrorKind::NotAllowed));
        assert!(matches!(fx[0], Effect::ShowError { .. }));
        assert!(fx.contains(&Effect::StopCapture));
        assert_eq!(c.state(), TurnState::Idle);
        // Ending afterwards does not loop back into capture
        assert!(c.handle(TurnEvent::RecognizerEnded).is_empty());
    }

    #[test]
    fn test_watchdog_recovers_silent_engine() {
        let mut c = speaking();
        assert!(c.handle(TurnEvent::WatchdogTick { engine_speaking: true }).is_empty());
        c.handle(TurnEvent::WatchdogTick { engine_speaking: false });
        assert_eq!(c.state(), TurnState::Idle);
        assert!(!c.synthesis_active());
    }

    #[test]
    fn test_watchdog_waits_for_late_synthesis_start() {
        let mut c = speaking();
        // Tick lands between speak() and the engine's start callback
        assert!(c.handle(TurnEvent::WatchdogTick { engine_speaking: false }).is_empty());
        assert_eq!(c.state(), TurnState::Speaking);

        assert!(c.handle(TurnEvent::SynthesisStarted).is_empty());
        assert_eq!(c.state(), TurnState::Speaking);
        assert!(c.synthesis_active());

        // Once confirmed, a silent engine is recovered on the next tick
        c.handle(TurnEvent::WatchdogTick { engine_speaking: false });
        assert_eq!(c.state(), TurnState::Idle);
    }

    #[test]
    fn test_watchdog_abandons_reply_that_never_starts() {
        let mut c = speaking();
        for _ in 1..UNCONFIRMED_SPEECH_TICKS {
            c.handle(TurnEvent::WatchdogTick { engine_speaking: false });
            assert_eq!(c.state(), TurnState::Speaking);
        }
        c.handle(TurnEvent::WatchdogTick { engine_speaking: false });
        assert_eq!(c.state(), TurnState::Idle);
        assert!(!c.synthesis_active());
    }

    #[test]
    fn test_watchdog_cancels_stray_speech() {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::StartCapture);
        assert_eq!(
            c.handle(TurnEvent::WatchdogTick { engine_speaking: true }),
            vec![Effect::CancelSpeech]
        );
    }

    #[test]
    fn test_live_mode_off_stops_listening() {
        let mut c = Coordinator::default();
        c.handle(TurnEvent::SetLiveMode(true));
        assert_eq!(c.handle(TurnEvent::SetLiveMode(false)), vec![Effect::StopCapture]);
        assert_eq!(c.state(), TurnState::Idle);
    }

    #[test]
    fn test_late_recognizer_start_is_stopped() {
        let mut c = speaking();
        assert_eq!(c.handle(TurnEvent::RecognizerStarted), vec![Effect::StopCapture]);
        assert!(!c.capture_active());
    }
}
