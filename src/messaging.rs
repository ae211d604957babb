// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Conversations between users.
//!
//! A [`Conversation`] keeps an append-only message history. Messages are only
//! ever removed by id through [`Conversation::delete`]; the read flag is the
//! one field that changes after a message is sent.

use crate::base::{IdSequence, MessageId};
use crate::validator;
use crate::LedgerError;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct User {
    name: String,
    contact: String,
    online: bool,
}

impl User {
    /// New users start offline.
    pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Result<Self, LedgerError> {
        let name = name.into();
        let contact = contact.into();
        validator::validate_username(&name)?;
        validator::validate_international_contact(&contact)?;
        Ok(Self {
            name,
            contact,
            online: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &str {
        &self.contact
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn go_online(&mut self) {
        self.online = true;
    }

    pub fn go_offline(&mut self) {
        self.online = false;
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TextMessage {
    id: MessageId,
    sender: String,
    receiver: String,
    body: String,
    timestamp: DateTime<Utc>,
    read: bool,
}

impl TextMessage {
    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_read(&self) -> bool {
        self.read
    }
}

#[derive(Debug, Clone)]
pub struct Conversation {
    participants: Vec<String>,
    history: Vec<TextMessage>,
}

impl Conversation {
    /// Starts a conversation between `participants`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidFormat`] when no participant is given.
    pub fn new<'a, I>(participants: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = &'a User>,
    {
        let mut conversation = Self {
            participants: Vec::new(),
            history: Vec::new(),
        };
        for user in participants {
            conversation.add_participant(user);
        }
        if conversation.participants.is_empty() {
            return Err(LedgerError::InvalidFormat {
                field: "participants",
            });
        }
        Ok(conversation)
    }

    /// Adds `user` unless already present.
    pub fn add_participant(&mut self, user: &User) {
        if !self.is_participant(user.name()) {
            self.participants.push(user.name.clone());
        }
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn is_participant(&self, name: &str) -> bool {
        self.participants.iter().any(|p| p == name)
    }

    /// Appends a message from `sender` to `receiver`, numbered from `ids`.
    ///
    /// An online receiver is notified through the log.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidMessage`] - empty body or longer than 250
    ///   characters.
    /// - [`LedgerError::NotFound`] - sender or receiver is not a participant.
    pub fn send(
        &mut self,
        ids: &IdSequence,
        sender: &User,
        receiver: &User,
        body: impl Into<String>,
    ) -> Result<MessageId, LedgerError> {
        let body = body.into();
        validator::validate_message_body(&body)?;
        for user in [sender, receiver] {
            if !self.is_participant(user.name()) {
                return Err(LedgerError::NotFound(format!("user {}", user.name())));
            }
        }

        let message = TextMessage {
            id: ids.next_message_id(),
            sender: sender.name.clone(),
            receiver: receiver.name.clone(),
            body,
            timestamp: Utc::now(),
            read: false,
        };
        let id = message.id;
        self.history.push(message);

        if receiver.is_online() {
            tracing::info!(to = %receiver.name(), from = %sender.name(), message = %id, "new message");
        }
        Ok(id)
    }

    /// Removes the message with `id`.
    pub fn delete(&mut self, id: MessageId) -> Result<TextMessage, LedgerError> {
        let index = self.position(id)?;
        Ok(self.history.remove(index))
    }

    pub fn mark_read(&mut self, id: MessageId) -> Result<(), LedgerError> {
        let index = self.position(id)?;
        self.history[index].read = true;
        Ok(())
    }

    pub fn mark_unread(&mut self, id: MessageId) -> Result<(), LedgerError> {
        let index = self.position(id)?;
        self.history[index].read = false;
        Ok(())
    }

    /// The most recent `limit` messages, oldest first.
    pub fn history(&self, limit: usize) -> &[TextMessage] {
        let start = self.history.len().saturating_sub(limit);
        &self.history[start..]
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    fn position(&self, id: MessageId) -> Result<usize, LedgerError> {
        self.history
            .iter()
            .position(|message| message.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("message {id}")))
    }
}
