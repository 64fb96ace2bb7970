/// A message posted between objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Queue of posted messages. Receivers drain it.
#[derive(Debug, Default)]
pub struct MessageBus {
    queue: Vec<Message>,
}

impl MessageBus {
    pub fn send(&mut self, message: Message) {
        self.queue.push(message);
    }

    pub fn pending(&self) -> &[Message] {
        &self.queue
    }

    /// Remove and return every message addressed to `to`, or broadcast (empty `to`)
    pub fn take_for(&mut self, to: &str) -> Vec<Message> {
        let (taken, kept) = self
            .queue
            .drain(..)
            .partition(|m| m.to.is_empty() || m.to == to);
        self.queue = kept;
        taken
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(to: &str) -> Message {
        Message {
            from: "a".into(),
            to: to.into(),
            subject: "hit".into(),
            body: String::new(),
        }
    }

    #[test]
    fn test_take_for_keeps_others() {
        let mut bus = MessageBus::default();
        bus.send(msg("player"));
        bus.send(msg("enemy"));
        bus.send(msg(""));

        let taken = bus.take_for("player");
        assert_eq!(taken.len(), 2);
        assert_eq!(bus.pending().len(), 1);
        assert_eq!(bus.pending()[0].to, "enemy");
    }
}
