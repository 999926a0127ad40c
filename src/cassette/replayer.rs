//! Serves recorded interactions back in order.

use std::collections::{HashMap, VecDeque};

use super::format::{Cassette, Interaction};

/// Hands out interactions per `(port, method)` in recorded order.
pub struct CassetteReplayer {
    queues: HashMap<(String, String), VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Indexes every interaction of `cassette`.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<(String, String), VecDeque<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction.clone());
        }
        Self { queues }
    }

    /// Takes the next unused interaction for `port::method`.
    ///
    /// # Panics
    ///
    /// Panics when the cassette holds no further interaction for the pair;
    /// a replay that asks for more than was recorded is a broken test.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Interaction {
        let queue = self.queue(port, method);
        queue.pop_front().unwrap_or_else(|| {
            panic!("Cassette exhausted: all interactions for {port}::{method} have been consumed")
        })
    }

    /// Takes the earliest unused interaction for `port::method` whose input
    /// equals `input`, falling back to the next one in order.
    ///
    /// Calls that were in flight concurrently while recording may have been
    /// written in completion order; matching on input keeps replay stable.
    ///
    /// # Panics
    ///
    /// Panics when the cassette holds no further interaction for the pair.
    pub fn next_matching(
        &mut self,
        port: &str,
        method: &str,
        input: &serde_json::Value,
    ) -> Interaction {
        let queue = self.queue(port, method);
        let index = queue.iter().position(|i| &i.input == input).unwrap_or(0);
        queue.remove(index).unwrap_or_else(|| {
            panic!("Cassette exhausted: all interactions for {port}::{method} have been consumed")
        })
    }

    fn queue(&mut self, port: &str, method: &str) -> &mut VecDeque<Interaction> {
        let key = (port.to_string(), method.to_string());
        if !self.queues.contains_key(&key) {
            let mut available: Vec<String> =
                self.queues.keys().map(|(p, m)| format!("{p}::{m}")).collect();
            available.sort();
            panic!(
                "Cassette exhausted: no interactions recorded for {port}::{method}. \
                 Available: [{}]",
                available.join(", ")
            );
        }
        self.queues.entry(key).or_default()
    }
}
