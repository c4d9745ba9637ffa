//! This module contains everything related to taking input from the user.
//!
//! The API key is the only thing asked for through a `dialoguer` prompt, and only before the game
//! starts. Once it has started, keystrokes are read on a background thread and handed over through
//! a channel, so that the countdown keeps ticking while the player thinks.

use std::cell::Cell;
use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::{anyhow, Result};
use console::{style, Key, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Password;

/// This function prompts for the OpenRouter API key when it was given neither as an argument nor
/// through the environment. The input is hidden and may not be empty.
pub(crate) fn take_api_key(term: &Term) -> Result<String> {
    let key = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{}", style("Enter your OpenRouter API key").bold()))
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("The API key can't be empty")
            } else {
                Ok(())
            }
        })
        .interact_on(term)?;

    Ok(key.trim().to_owned())
}

/// This struct reads keystrokes on a background thread and forwards them over a channel.
///
/// The thread only reads a key when asked to. Reading puts the terminal in raw mode until a key
/// arrives, so a read left pending when the game exits would leave the shell without echo.
pub(crate) struct KeyPump {
    /// The receiving end of the keystroke channel.
    keys: Receiver<Key>,
    /// Whether a key has been asked for and not received yet.
    pending: Cell<bool>,
    /// The sending end of the channel asking the thread for the next key.
    requests: Sender<()>,
    /// The thread reading from the terminal. It exits once either channel is closed or the
    /// terminal fails.
    _reader: JoinHandle<()>,
}

impl KeyPump {
    /// This function spawns the thread that reads from `term`.
    pub(crate) fn spawn(term: Term) -> Self {
        Self::spawn_with(move || term.read_key())
    }

    /// This function spawns the thread that calls `read` once for every key asked for.
    fn spawn_with<F>(mut read: F) -> Self
    where
        F: FnMut() -> io::Result<Key> + Send + 'static,
    {
        let (requests, wanted) = mpsc::channel::<()>();
        let (sender, keys) = mpsc::channel();
        let reader = thread::spawn(move || {
            while wanted.recv().is_ok() {
                let Ok(key) = read() else {
                    break;
                };
                if sender.send(key).is_err() {
                    break;
                }
            }
        });

        Self {
            keys,
            pending: Cell::new(false),
            requests,
            _reader: reader,
        }
    }

    /// This function discards every keystroke received so far. It is used after a loading screen,
    /// so that keys pressed while waiting don't trigger the next screen.
    pub(crate) fn drain(&self) {
        while self.keys.try_recv().is_ok() {
            self.pending.set(false);
        }
    }

    /// This function blocks until a key is pressed.
    pub(crate) fn recv(&self) -> Result<Key> {
        self.request()?;
        let key = self
            .keys
            .recv()
            .map_err(|err| anyhow!("the terminal stopped sending keys: {err}"))?;
        self.pending.set(false);

        Ok(key)
    }

    /// This function blocks until a key is pressed or `deadline` is reached, whichever comes first.
    /// Reaching the deadline yields `None` and leaves the read pending for the next call.
    pub(crate) fn recv_until(&self, deadline: Instant) -> Result<Option<Key>> {
        self.request()?;
        let timeout = deadline.saturating_duration_since(Instant::now());

        match self.keys.recv_timeout(timeout) {
            Ok(key) => {
                self.pending.set(false);
                Ok(Some(key))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(anyhow!("the terminal stopped sending keys"))
            }
        }
    }

    /// This function asks the thread for the next key, unless it is already reading one.
    fn request(&self) -> Result<()> {
        if !self.pending.get() {
            self.requests
                .send(())
                .map_err(|err| anyhow!("the key reader has stopped: {err}"))?;
            self.pending.set(true);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    /// This function creates a pump handing out `keys` in order, each read taking `delay`, along
    /// with the number of reads made so far.
    fn scripted(keys: Vec<Key>, delay: Duration) -> (KeyPump, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reads);
        let mut keys = keys.into_iter();

        let pump = KeyPump::spawn_with(move || {
            let _ = counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(delay);
            keys.next().ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))
        });

        (pump, reads)
    }

    #[test]
    fn reads_only_when_asked() {
        let (pump, reads) = scripted(vec![Key::Char('a'), Key::Enter], Duration::ZERO);

        thread::sleep(Duration::from_millis(50));
        assert_eq!(reads.load(Ordering::SeqCst), 0);

        assert_eq!(pump.recv().unwrap(), Key::Char('a'));
        thread::sleep(Duration::from_millis(50));
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn timed_out_read_is_not_asked_for_twice() {
        let (pump, reads) = scripted(vec![Key::Enter], Duration::from_millis(200));

        let early = pump.recv_until(Instant::now() + Duration::from_millis(20));
        assert_eq!(early.unwrap(), None);

        assert_eq!(pump.recv().unwrap(), Key::Enter);
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drained_keys_are_not_pending() {
        let (pump, reads) = scripted(vec![Key::Char('x'), Key::Enter], Duration::ZERO);

        let _first = pump.recv_until(Instant::now());
        thread::sleep(Duration::from_millis(50));
        pump.drain();

        assert_eq!(pump.recv().unwrap(), Key::Enter);
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failing_terminal_is_reported() {
        let (pump, _) = scripted(Vec::new(), Duration::ZERO);

        assert!(pump.recv().is_err());
    }
}
