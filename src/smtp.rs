// Trailhead
// Copyright 2025 The Trailhead Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Utilities to send messages over email.

use crate::driver::{DriverError, DriverResult};
use crate::env::get_required_var;
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Options to establish an SMTP connection.
#[derive(Debug)]
pub(crate) struct SmtpOptions {
    /// SMTP server to use.
    pub(crate) relay: String,

    /// Username for logging into the SMTP server.
    pub(crate) username: String,

    /// Password for logging into the SMTP server.
    pub(crate) password: String,

    /// Sender mailbox for all outgoing messages.
    pub(crate) from: Mailbox,
}

impl SmtpOptions {
    /// Initializes a set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_RELAY`, `<prefix>_USERNAME`, `<prefix>_PASSWORD`
    /// and `<prefix>_FROM`.
    pub(crate) fn from_env(prefix: &str) -> Result<Self, String> {
        let from = get_required_var::<String>(prefix, "FROM")?;
        let from = from
            .parse::<Mailbox>()
            .map_err(|e| format!("Invalid mailbox in environment variable {}_FROM: {}", prefix, e))?;
        Ok(Self {
            relay: get_required_var::<String>(prefix, "RELAY")?,
            username: get_required_var::<String>(prefix, "USERNAME")?,
            password: get_required_var::<String>(prefix, "PASSWORD")?,
            from,
        })
    }
}

/// Trait to abstract the integration with the mailer.
#[async_trait]
pub(crate) trait Mailer {
    /// Sends a message over SMTP.
    async fn send(&self, message: Message) -> DriverResult<()>;
}

/// Mailer backed by a real SMTP connection using `lettre`.
#[derive(Clone)]
pub(crate) struct SmtpMailer(AsyncSmtpTransport<Tokio1Executor>);

impl SmtpMailer {
    /// Establishes a connection to the SMTP server.
    pub(crate) fn connect(opts: SmtpOptions) -> Result<Self, String> {
        let creds = Credentials::new(opts.username, opts.password);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&opts.relay)
            .map_err(|e| format!("{}", e))?
            .credentials(creds)
            .build();
        Ok(SmtpMailer(mailer))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: Message) -> DriverResult<()> {
        self.0
            .send(message)
            .await
            .map_err(|e| DriverError::BackendError(format!("SMTP communication failed: {}", e)))?;
        Ok(())
    }
}

/// Test utilities for the mailer.
#[cfg(test)]
pub(crate) mod testutils {
    use super::*;
    use futures::lock::Mutex;

    /// A mailer that records all messages instead of delivering them.
    #[derive(Default)]
    pub(crate) struct RecorderMailer {
        /// Messages sent so far, in order.
        inboxes: Mutex<Vec<Message>>,
    }

    impl RecorderMailer {
        /// Returns copies of all messages sent so far.
        pub(crate) async fn sent(&self) -> Vec<Message> {
            self.inboxes.lock().await.clone()
        }

        /// Checks whether any sent message was addressed to `to` and contains `needle` in its
        /// body.
        pub(crate) async fn has_message_for(&self, to: &str, needle: &str) -> bool {
            for message in self.inboxes.lock().await.iter() {
                let formatted = String::from_utf8(message.formatted()).unwrap();
                if formatted.contains(to) && formatted.contains(needle) {
                    return true;
                }
            }
            false
        }
    }

    #[async_trait]
    impl Mailer for RecorderMailer {
        async fn send(&self, message: Message) -> DriverResult<()> {
            self.inboxes.lock().await.push(message);
            Ok(())
        }
    }
}
