// Feedback sound selection and playback.
use super::session::{Milestone, Mode};
use std::collections::HashMap;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::Closure;
use web_sys::HtmlAudioElement;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Ding,
    Buzzer,
    Shatter,
    Success,
    Checkpoint1,
    Checkpoint2,
    Checkpoint3,
}

impl SoundCue {
    pub fn asset_path(self) -> &'static str {
        match self {
            SoundCue::Ding => "assets/sounds/ding-402325.mp3",
            SoundCue::Buzzer => "assets/sounds/wrong-47985.mp3",
            SoundCue::Shatter => "assets/sounds/glass-break-3-102271.mp3",
            SoundCue::Success => "assets/sounds/success.wav",
            SoundCue::Checkpoint1 => "assets/sounds/checkpoint_1.wav",
            SoundCue::Checkpoint2 => "assets/sounds/checkpoint_2.wav",
            SoundCue::Checkpoint3 => "assets/sounds/checkpoint_3.wav",
        }
    }
}

/// Cue for an answered problem. Milestone fanfares only play in Steel-Grub.
pub fn feedback_cue(mode: Mode, correct: bool, milestone: Option<Milestone>) -> SoundCue {
    if !correct {
        return SoundCue::Buzzer;
    }
    match (mode, milestone) {
        (Mode::SteelGrub, Some(Milestone::Checkpoint1)) => SoundCue::Checkpoint1,
        (Mode::SteelGrub, Some(Milestone::Checkpoint2)) => SoundCue::Checkpoint2,
        (Mode::SteelGrub, Some(Milestone::Checkpoint3)) => SoundCue::Checkpoint3,
        (Mode::SteelGrub, Some(Milestone::Final)) => SoundCue::Success,
        _ => SoundCue::Ding,
    }
}

/// Lazily created `<audio>` elements, one per cue.
pub struct SoundBank {
    volume: f64,
    clips: HashMap<SoundCue, HtmlAudioElement>,
    /// Shared `catch` handler for `play()` promises (autoplay policy, missing asset).
    on_rejected: Option<Closure<dyn FnMut(JsValue)>>,
}

impl SoundBank {
    pub fn new(volume: f64) -> Self {
        Self { volume, clips: HashMap::new(), on_rejected: None }
    }

    pub fn play(&mut self, cue: SoundCue, muted: bool) {
        if muted {
            return;
        }
        if !self.clips.contains_key(&cue) {
            match HtmlAudioElement::new_with_src(cue.asset_path()) {
                Ok(audio) => {
                    audio.set_volume(self.volume);
                    self.clips.insert(cue, audio);
                }
                Err(err) => {
                    log::warn!("could not create audio for {cue:?}: {err:?}");
                    return;
                }
            }
        }
        let Some(audio) = self.clips.get(&cue) else {
            return;
        };
        audio.set_current_time(0.0);
        let on_rejected = self.on_rejected.get_or_insert_with(|| {
            Closure::wrap(Box::new(|err: JsValue| {
                log::debug!("audio playback rejected: {err:?}");
            }) as Box<dyn FnMut(JsValue)>)
        });
        match audio.play() {
            Ok(promise) => {
                let _ = promise.catch(on_rejected);
            }
            Err(err) => log::debug!("could not play {cue:?}: {err:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_answer_buzzes_in_every_mode() {
        for mode in [Mode::Practice, Mode::SteelGrub] {
            assert_eq!(feedback_cue(mode, false, None), SoundCue::Buzzer);
            assert_eq!(feedback_cue(mode, false, Some(Milestone::Final)), SoundCue::Buzzer);
        }
    }

    #[test]
    fn test_practice_ignores_milestones() {
        assert_eq!(feedback_cue(Mode::Practice, true, Some(Milestone::Checkpoint2)), SoundCue::Ding);
        assert_eq!(feedback_cue(Mode::Practice, true, Some(Milestone::Final)), SoundCue::Ding);
    }

    #[test]
    fn test_steel_grub_milestone_cues() {
        let m = Mode::SteelGrub;
        assert_eq!(feedback_cue(m, true, None), SoundCue::Ding);
        assert_eq!(feedback_cue(m, true, Some(Milestone::Checkpoint1)), SoundCue::Checkpoint1);
        assert_eq!(feedback_cue(m, true, Some(Milestone::Checkpoint2)), SoundCue::Checkpoint2);
        assert_eq!(feedback_cue(m, true, Some(Milestone::Checkpoint3)), SoundCue::Checkpoint3);
        assert_eq!(feedback_cue(m, true, Some(Milestone::Final)), SoundCue::Success);
    }

    #[test]
    fn test_muted_bank_never_touches_dom() {
        // Native targets have no DOM; a muted play must return before creating audio.
        let mut bank = SoundBank::new(0.4);
        bank.play(SoundCue::Ding, true);
        assert!(bank.clips.is_empty());
        assert!(bank.on_rejected.is_none());
    }

    #[cfg(target_arch = "wasm32")]
    wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

    #[cfg(target_arch = "wasm32")]
    #[wasm_bindgen_test::wasm_bindgen_test]
    fn test_unmuted_play_catches_rejection() {
        // Headless browsers refuse autoplay; the rejection must land on our handler.
        let mut bank = SoundBank::new(0.0);
        bank.play(SoundCue::Ding, false);
        bank.play(SoundCue::Buzzer, false);
        assert_eq!(bank.clips.len(), 2);
        assert!(bank.on_rejected.is_some());
    }
}
