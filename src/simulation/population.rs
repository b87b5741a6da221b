//! Population registry - owns every agent, in a stable processing order
//!
//! Agents live in a generational slot map and are threaded on a doubly
//! linked list that fixes the turn order. Newborns join at the tail.
//!
//! A turn pass walks the list with [`Population::begin_pass`] and
//! [`Population::advance`]. `advance` captures the successor *before* the
//! caller acts on the returned agent, and [`Population::remove`] moves that
//! captured successor along if it is the one being removed. So an action may
//! destroy the acting agent, or whichever agent was due next, without the
//! pass skipping or revisiting anyone.

use slotmap::SlotMap;

use crate::core::types::AgentId;
use crate::simulation::agent::Agent;

#[derive(Debug, Clone)]
struct Entry {
    agent: Agent,
    prev: Option<AgentId>,
    next: Option<AgentId>,
}

/// All living agents
#[derive(Debug, Clone, Default)]
pub struct Population {
    entries: SlotMap<AgentId, Entry>,
    head: Option<AgentId>,
    tail: Option<AgentId>,
    /// Next agent due in the current pass
    cursor: Option<AgentId>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.entries.get(id).map(|e| &e.agent)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.entries.get_mut(id).map(|e| &mut e.agent)
    }

    /// Mutable access to two different agents at once
    pub fn get2_mut(&mut self, a: AgentId, b: AgentId) -> Option<(&mut Agent, &mut Agent)> {
        let [ea, eb] = self.entries.get_disjoint_mut([a, b])?;
        Some((&mut ea.agent, &mut eb.agent))
    }

    pub fn first(&self) -> Option<AgentId> {
        self.head
    }

    pub fn last(&self) -> Option<AgentId> {
        self.tail
    }

    pub fn next_of(&self, id: AgentId) -> Option<AgentId> {
        self.entries.get(id).and_then(|e| e.next)
    }

    /// Append at the tail of the processing order
    pub fn push_back(&mut self, agent: Agent) -> AgentId {
        let prev = self.tail;
        let id = self.entries.insert(Entry {
            agent,
            prev,
            next: None,
        });
        match prev.and_then(|p| self.entries.get_mut(p)) {
            Some(entry) => entry.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        id
    }

    /// Unlink and return an agent
    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let entry = self.entries.remove(id)?;

        if self.cursor == Some(id) {
            self.cursor = entry.next;
        }
        match entry.prev.and_then(|p| self.entries.get_mut(p)) {
            Some(prev) => prev.next = entry.next,
            None => self.head = entry.next,
        }
        match entry.next.and_then(|n| self.entries.get_mut(n)) {
            Some(next) => next.prev = entry.prev,
            None => self.tail = entry.prev,
        }

        debug_assert!(self.links_consistent(), "population list corrupted by removal");
        Some(entry.agent)
    }

    /// Start a processing pass at the head
    pub fn begin_pass(&mut self) {
        self.cursor = self.head;
    }

    /// Take the next agent of the pass, capturing its successor first
    pub fn advance(&mut self) -> Option<AgentId> {
        let current = self.cursor?;
        self.cursor = self.next_of(current);
        Some(current)
    }

    /// Agents in processing order
    pub fn iter(&self) -> PopulationIter<'_> {
        PopulationIter {
            population: self,
            at: self.head,
        }
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Forward and backward links agree and cover every agent
    pub fn links_consistent(&self) -> bool {
        let mut count = 0;
        let mut prev = None;
        let mut at = self.head;
        while let Some(id) = at {
            let Some(entry) = self.entries.get(id) else {
                return false;
            };
            if entry.prev != prev {
                return false;
            }
            count += 1;
            if count > self.entries.len() {
                return false;
            }
            prev = Some(id);
            at = entry.next;
        }
        prev == self.tail && count == self.entries.len()
    }
}

/// Iterator over agents in processing order
pub struct PopulationIter<'a> {
    population: &'a Population,
    at: Option<AgentId>,
}

impl<'a> Iterator for PopulationIter<'a> {
    type Item = (AgentId, &'a Agent);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.at?;
        let entry = self.population.entries.get(id)?;
        self.at = entry.next;
        Some((id, &entry.agent))
    }
}
