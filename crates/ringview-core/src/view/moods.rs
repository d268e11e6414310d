// src/view/moods.rs
//! Semantic setters: one call per device event.
//!
//! Each setter picks a face and asks the voice for a status line, then draws.
//! They are thin conveniences over [`View::set`] and [`View::update`]; update
//! failures are logged rather than returned, since an event handler has
//! nothing better to do with them.

use std::thread;
use std::time::Duration;

use log::error;

use super::View;
use crate::faces::Face;
use crate::voice::Utterance;

/// Faces that mean the device is busy with something worth showing.
const NOT_NORMAL: [Face; 10] = [
    Face::Intense,
    Face::Cool,
    Face::Bored,
    Face::Happy,
    Face::Excited,
    Face::Motivated,
    Face::Demotivated,
    Face::Smart,
    Face::Sad,
    Face::Lonely,
];

/// Shown instead of the exact total above this many peers.
const OVER_9000: u32 = 9000;

/// A nearby unit of the same kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Peer {
    pub name: String,
    /// Textual face the peer currently shows.
    pub face: String,
    /// Signal strength in dBm.
    pub rssi: i32,
    pub pwnd_run: u32,
    pub pwnd_total: u32,
    /// How many times we have met, this time included.
    pub encounters: u32,
}

impl Peer {
    pub fn first_encounter(&self) -> bool {
        self.encounters <= 1
    }

    pub fn is_good_friend(&self, threshold: u32) -> bool {
        self.encounters >= threshold
    }

    /// Signal bars, 1 to 4.
    pub fn signal_bars(&self) -> usize {
        match self.rssi {
            r if r >= -67 => 4,
            r if r >= -70 => 3,
            r if r >= -80 => 2,
            _ => 1,
        }
    }
}

/// Summary of the previous session, shown in manual mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LastSession {
    pub epochs: u32,
    pub handshakes: u32,
    /// Preformatted, e.g. `01:02:03`.
    pub duration: String,
    pub associated: u32,
    pub deauthed: u32,
    pub peers: u32,
    pub last_peer: Option<Peer>,
    pub total_unique_handshakes: u32,
}

/// Friend line: signal bars, name and counters.
pub(crate) fn friend_label(peer: &Peer, num_total: u32) -> String {
    let bars = peer.signal_bars();
    let mut name = "▌".repeat(bars);
    name.push_str(&"│".repeat(4 - bars));
    name.push_str(&format!(" {} {} ({})", peer.name, peer.pwnd_run, peer.pwnd_total));

    if num_total > OVER_9000 {
        name.push_str(" of over 9000");
    } else if num_total > 1 {
        name.push_str(&format!(" of {num_total}"));
    }
    name
}

impl View {
    fn refresh(&self, force: bool) {
        if let Err(e) = self.update(force, &[]) {
            error!("View update failed: {}", e);
        }
    }

    fn mood(&self, face: Face, status: Utterance<'_>) {
        self.set("face", self.face_text(face));
        self.set("status", &self.say(status));
    }

    /// Whether the current face is a resting one.
    pub fn is_normal(&self) -> bool {
        let current = self.get("face");
        !NOT_NORMAL
            .iter()
            .any(|f| current.as_deref() == Some(self.face_text(*f)))
    }

    pub fn on_starting(&self) {
        let status = format!("{}\n(v{})", self.say(Utterance::Starting), env!("CARGO_PKG_VERSION"));
        self.set("status", &status);
        self.set("face", self.face_text(Face::Awake));
        self.refresh(false);
    }

    pub fn on_ai_ready(&self) {
        self.set("mode", "  AI");
        self.mood(Face::Happy, Utterance::AiReady);
        self.refresh(false);
    }

    pub fn on_manual_mode(&self, session: &LastSession) {
        self.set("mode", "MANU");
        let face = if session.epochs > 3 && session.handshakes == 0 {
            Face::Sad
        } else {
            Face::Happy
        };
        self.mood(face, Utterance::LastSession(session));
        if self.has_element("epoch") {
            self.set("epoch", &format!("{:04}", session.epochs));
        }
        self.set("uptime", &session.duration);
        self.set("channel", "-");
        self.set("aps", &session.associated.to_string());
        self.set(
            "shakes",
            &format!("{} ({})", session.handshakes, session.total_unique_handshakes),
        );
        self.set_closest_peer(session.last_peer.as_ref(), session.peers);
        self.refresh(false);
    }

    pub fn on_keys_generation(&self) {
        self.mood(Face::Awake, Utterance::KeysGeneration);
        self.refresh(false);
    }

    pub fn on_normal(&self) {
        self.mood(Face::Awake, Utterance::Normal);
        self.refresh(false);
    }

    /// Show the strongest peer in the friend slots, or clear them.
    pub fn set_closest_peer(&self, peer: Option<&Peer>, num_total: u32) {
        match peer {
            None => {
                self.unset("friend_face");
                self.unset("friend_name");
            }
            Some(peer) => {
                self.set("friend_face", &peer.face);
                self.set("friend_name", &friend_label(peer, num_total));
            }
        }
        self.refresh(false);
    }

    pub fn on_new_peer(&self, peer: &Peer) {
        let face = if peer.first_encounter() {
            self.pick(&[Face::Awake, Face::Cool])
        } else if peer.is_good_friend(self.good_friend_threshold()) {
            self.pick(&[Face::Motivated, Face::Friend, Face::Happy])
        } else {
            self.pick(&[Face::Excited, Face::Happy, Face::Smart])
        };
        self.mood(face, Utterance::NewPeer(&peer.name));
        self.refresh(false);
    }

    pub fn on_lost_peer(&self, peer: &Peer) {
        self.mood(Face::Lonely, Utterance::LostPeer(&peer.name));
        self.refresh(false);
    }

    pub fn on_free_channel(&self, channel: u8) {
        self.mood(Face::Smart, Utterance::FreeChannel(channel));
        self.refresh(false);
    }

    pub fn on_reading_logs(&self, lines_so_far: usize) {
        self.mood(Face::Smart, Utterance::ReadingLogs(lines_so_far));
        self.refresh(false);
    }

    /// Block the calling thread for `secs`, animating a nap or a look-around.
    ///
    /// A face that was not resting stays up for the first part of the wait.
    pub fn wait(&self, secs: f32, sleeping: bool, good_mood: bool) {
        const STEPS: usize = 10;

        let was_normal = self.is_normal();
        let part = secs / STEPS as f32;
        let pause = Duration::try_from_secs_f32(part).unwrap_or_default();
        let mut remaining = secs;

        for step in 0..STEPS {
            if was_normal || step > 5 {
                let whole = remaining.max(0.0) as u32;
                if sleeping {
                    if remaining > 1.0 {
                        self.mood(Face::Sleep, Utterance::Napping(whole));
                    } else {
                        self.mood(Face::Sleep2, Utterance::Awakening);
                    }
                } else {
                    let face = match (step % 2 == 0, good_mood) {
                        (true, true) => Face::LookRHappy,
                        (true, false) => Face::LookR,
                        (false, true) => Face::LookLHappy,
                        (false, false) => Face::LookL,
                    };
                    self.mood(face, Utterance::Waiting(whole));
                }
                self.refresh(false);
            }

            thread::sleep(pause);
            remaining -= part;
        }

        self.on_normal();
    }

    /// Draw the goodbye face, then freeze the display for good.
    pub fn on_shutdown(&self) {
        self.mood(Face::Sleep, Utterance::Shutdown);
        self.refresh(true);
        self.freeze();
    }

    pub fn on_bored(&self) {
        self.mood(Face::Bored, Utterance::Bored);
        self.refresh(false);
    }

    pub fn on_sad(&self) {
        self.mood(Face::Sad, Utterance::Sad);
        self.refresh(false);
    }

    pub fn on_angry(&self) {
        self.mood(Face::Angry, Utterance::Angry);
        self.refresh(false);
    }

    pub fn on_motivated(&self, reward: f32) {
        self.mood(Face::Motivated, Utterance::Motivated(reward));
        self.refresh(false);
    }

    pub fn on_demotivated(&self, reward: f32) {
        self.mood(Face::Demotivated, Utterance::Demotivated(reward));
        self.refresh(false);
    }

    pub fn on_excited(&self) {
        self.mood(Face::Excited, Utterance::Excited);
        self.refresh(false);
    }

    pub fn on_assoc(&self, ap: &str) {
        self.mood(Face::Intense, Utterance::Assoc(ap));
        self.refresh(false);
    }

    pub fn on_deauth(&self, station: &str) {
        self.mood(Face::Cool, Utterance::Deauth(station));
        self.refresh(false);
    }

    pub fn on_miss(&self, who: &str) {
        self.mood(Face::Sad, Utterance::Miss(who));
        self.refresh(false);
    }

    pub fn on_grateful(&self) {
        self.mood(Face::Grateful, Utterance::Grateful);
        self.refresh(false);
    }

    pub fn on_lonely(&self) {
        self.mood(Face::Lonely, Utterance::Lonely);
        self.refresh(false);
    }

    pub fn on_handshakes(&self, new_shakes: u32) {
        self.mood(Face::Happy, Utterance::Handshakes(new_shakes));
        self.refresh(false);
    }

    pub fn on_unread_messages(&self, count: u32, total: u32) {
        self.mood(Face::Excited, Utterance::UnreadMessages { count, total });
        self.refresh(false);
    }

    /// Always redraws, even when the upload face did not change.
    pub fn on_uploading(&self, to: &str) {
        let face = self.pick(&[Face::Upload, Face::Upload1, Face::Upload2]);
        self.mood(face, Utterance::Uploading(to));
        self.refresh(true);
    }

    pub fn on_rebooting(&self) {
        self.mood(Face::Broken, Utterance::Rebooting);
        self.refresh(false);
    }

    pub fn on_custom(&self, text: &str) {
        self.mood(Face::Debug, Utterance::Custom(text));
        self.refresh(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sink::Layout;

    fn view() -> View {
        View::builder(Layout::round_240())
            .with_config(Config::default())
            .build()
            .unwrap()
    }

    fn peer(rssi: i32, encounters: u32) -> Peer {
        Peer {
            name: "bob".into(),
            face: Face::Friend.default_text().into(),
            rssi,
            pwnd_run: 3,
            pwnd_total: 42,
            encounters,
        }
    }

    #[test]
    fn test_signal_bars() {
        assert_eq!(peer(-50, 1).signal_bars(), 4);
        assert_eq!(peer(-67, 1).signal_bars(), 4);
        assert_eq!(peer(-70, 1).signal_bars(), 3);
        assert_eq!(peer(-75, 1).signal_bars(), 2);
        assert_eq!(peer(-90, 1).signal_bars(), 1);
    }

    #[test]
    fn test_friend_label() {
        assert_eq!(friend_label(&peer(-75, 1), 1), "▌▌││ bob 3 (42)");
        assert_eq!(friend_label(&peer(-60, 1), 5), "▌▌▌▌ bob 3 (42) of 5");
        assert_eq!(friend_label(&peer(-90, 1), 9001), "▌│││ bob 3 (42) of over 9000");
    }

    #[test]
    fn test_closest_peer_sets_and_clears() {
        let view = view();
        view.set_closest_peer(Some(&peer(-60, 2)), 3);
        assert_eq!(view.get("friend_face").as_deref(), Some(Face::Friend.default_text()));
        assert_eq!(view.get("friend_name").as_deref(), Some("▌▌▌▌ bob 3 (42) of 3"));

        view.set_closest_peer(None, 0);
        assert_eq!(view.get("friend_face"), None);
        assert_eq!(view.get("friend_name"), None);
    }

    #[test]
    fn test_is_normal() {
        let view = view();
        assert!(view.is_normal());
        view.on_bored();
        assert!(!view.is_normal());
        view.on_normal();
        assert!(view.is_normal());
    }

    #[test]
    fn test_new_peer_faces() {
        let view = view();
        let texts = |faces: &[Face]| faces.iter().map(|f| f.default_text().to_owned()).collect::<Vec<_>>();

        view.on_new_peer(&peer(-60, 1));
        assert!(texts(&[Face::Awake, Face::Cool]).contains(&view.get("face").unwrap()));

        view.on_new_peer(&peer(-60, 50));
        assert!(texts(&[Face::Motivated, Face::Friend, Face::Happy]).contains(&view.get("face").unwrap()));

        view.on_new_peer(&peer(-60, 3));
        assert!(texts(&[Face::Excited, Face::Happy, Face::Smart]).contains(&view.get("face").unwrap()));
        assert_eq!(view.get("status").as_deref(), Some("Hello bob! Nice to meet you."));
    }

    #[test]
    fn test_uploading_varies_face() {
        let view = view();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..3 {
            view.on_uploading("the cloud");
            seen.insert(view.get("face").unwrap());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_manual_mode() {
        let view = view();
        let session = LastSession {
            epochs: 5,
            handshakes: 0,
            duration: "00:10:00".into(),
            associated: 2,
            total_unique_handshakes: 7,
            ..LastSession::default()
        };
        view.on_manual_mode(&session);

        assert_eq!(view.get("mode").as_deref(), Some("MANU"));
        assert_eq!(view.get("face").as_deref(), Some(Face::Sad.default_text()));
        assert_eq!(view.get("uptime").as_deref(), Some("UP 00:10:00"));
        assert_eq!(view.get("channel").as_deref(), Some("CH -"));
        assert_eq!(view.get("aps").as_deref(), Some("APS 2"));
        assert_eq!(view.get("shakes").as_deref(), Some("PWND 0 (7)"));
    }

    #[test]
    fn test_shutdown_draws_then_freezes() {
        let view = view();
        view.update(true, &[]).unwrap();
        let generation = view.preview().generation();

        view.on_shutdown();
        assert!(view.is_frozen());
        assert_eq!(view.preview().generation(), generation + 1);
        assert_eq!(view.get("face").as_deref(), Some(Face::Sleep.default_text()));

        view.on_excited();
        assert_eq!(view.preview().generation(), generation + 1);
    }

    #[test]
    fn test_short_wait_ends_normal() {
        let view = view();
        view.wait(0.05, true, false);
        assert_eq!(view.get("face").as_deref(), Some(Face::Awake.default_text()));
        assert!(view.is_normal());
    }
}
