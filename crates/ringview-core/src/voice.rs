// src/voice.rs
//! Status line text provider.
//!
//! The view never composes status sentences itself: it describes the event as
//! an [`Utterance`] and asks a [`Voice`] for the string. Localised or more
//! talkative voices live outside this crate; [`PlainVoice`] is a terse
//! English default.

use crate::view::LastSession;

/// Something the device wants to say.
#[derive(Debug, Clone, Copy)]
pub enum Utterance<'a> {
    Default,
    Starting,
    AiReady,
    KeysGeneration,
    Normal,
    LastSession(&'a LastSession),
    NewPeer(&'a str),
    LostPeer(&'a str),
    FreeChannel(u8),
    ReadingLogs(usize),
    Napping(u32),
    Awakening,
    Waiting(u32),
    Shutdown,
    Bored,
    Sad,
    Angry,
    Motivated(f32),
    Demotivated(f32),
    Excited,
    Assoc(&'a str),
    Deauth(&'a str),
    Miss(&'a str),
    Grateful,
    Lonely,
    Handshakes(u32),
    UnreadMessages { count: u32, total: u32 },
    Uploading(&'a str),
    Rebooting,
    Custom(&'a str),
}

/// Opaque string provider for the status line.
pub trait Voice: Send + Sync {
    fn say(&self, utterance: Utterance<'_>) -> String;
}

/// Plain English voice.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainVoice;

impl Voice for PlainVoice {
    fn say(&self, utterance: Utterance<'_>) -> String {
        match utterance {
            Utterance::Default => "ZzzzZZzzzzZzzz".into(),
            Utterance::Starting => "Hi, I'm ringview! Starting ...".into(),
            Utterance::AiReady => "AI ready.".into(),
            Utterance::KeysGeneration => "Generating keys, do not turn off ...".into(),
            Utterance::Normal => String::new(),
            Utterance::LastSession(s) => {
                let mut out = format!("Up {}, {} epochs", s.duration, s.epochs);
                if s.associated > 0 {
                    out.push_str(&format!(", {} new friends", s.associated));
                }
                if s.handshakes > 0 {
                    out.push_str(&format!(", {} handshakes", s.handshakes));
                }
                if s.peers > 0 {
                    out.push_str(&format!(", met {} peers", s.peers));
                }
                out
            }
            Utterance::NewPeer(name) => format!("Hello {name}! Nice to meet you."),
            Utterance::LostPeer(name) => format!("{name} is gone ..."),
            Utterance::FreeChannel(ch) => format!("Hey, channel {ch} is free!"),
            Utterance::ReadingLogs(0) => "Reading last session logs ...".into(),
            Utterance::ReadingLogs(n) => format!("Read {n} log lines so far ..."),
            Utterance::Napping(secs) => format!("Napping for {secs}s ..."),
            Utterance::Awakening => "...".into(),
            Utterance::Waiting(secs) => format!("Waiting for {secs}s ..."),
            Utterance::Shutdown => "Good night, I'm going to sleep.".into(),
            Utterance::Bored => "I'm bored ...".into(),
            Utterance::Sad => "I'm sad".into(),
            Utterance::Angry => "Leave me alone ...".into(),
            Utterance::Motivated(_) => "This is the best day of my life!".into(),
            Utterance::Demotivated(_) => "Shitty day :/".into(),
            Utterance::Excited => "I'm having so much fun!".into(),
            Utterance::Assoc(what) => format!("Hey {what}, let's be friends!"),
            Utterance::Deauth(who) => format!("Just decided that {who} needs no WiFi!"),
            Utterance::Miss(who) => format!("Missed {who} ..."),
            Utterance::Grateful => "Good friends are a blessing!".into(),
            Utterance::Lonely => "Nobody wants to play with me ...".into(),
            Utterance::Handshakes(1) => "Cool, we got a new handshake!".into(),
            Utterance::Handshakes(n) => format!("Cool, we got {n} new handshakes!"),
            Utterance::UnreadMessages { count, total } => format!("You have {count} new messages ({total} total)"),
            Utterance::Uploading(to) => format!("Uploading data to {to} ..."),
            Utterance::Rebooting => "Oops, something went wrong ... Rebooting ...".into(),
            Utterance::Custom(text) => text.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_voice_interpolates() {
        let v = PlainVoice;
        assert_eq!(v.say(Utterance::FreeChannel(6)), "Hey, channel 6 is free!");
        assert_eq!(v.say(Utterance::Handshakes(1)), "Cool, we got a new handshake!");
        assert_eq!(v.say(Utterance::Handshakes(3)), "Cool, we got 3 new handshakes!");
        assert_eq!(v.say(Utterance::Custom("hi")), "hi");
    }

    #[test]
    fn test_last_session_summary() {
        let session = LastSession {
            epochs: 12,
            handshakes: 2,
            duration: "01:02:03".into(),
            associated: 0,
            ..LastSession::default()
        };
        assert_eq!(
            PlainVoice.say(Utterance::LastSession(&session)),
            "Up 01:02:03, 12 epochs, 2 handshakes"
        );
    }
}
