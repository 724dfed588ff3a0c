//! Shared fixtures for indexed-map integration tests

#![allow(dead_code)]

use indexed_map::{IndexRegistry, IndexedMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub ssn: String,
}

impl Person {
    pub fn new(id: i64, first_name: &str, last_name: &str, ssn: &str) -> Self {
        Self {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            ssn: ssn.to_string(),
        }
    }

    /// Last four digits of the SSN, empty when the SSN is too short
    pub fn ssn4(&self) -> String {
        if self.ssn.len() < 4 {
            String::new()
        } else {
            self.ssn[self.ssn.len() - 4..].to_string()
        }
    }
}

pub fn person_registry() -> IndexRegistry<Person> {
    IndexRegistry::builder()
        .index("SSN", |p: &Person| p.ssn.clone())
        .index("SSN4", |p: &Person| p.ssn4())
        .index("LastName", |p: &Person| p.last_name.clone())
        .build()
        .expect("valid person registry")
}

pub fn person_map() -> IndexedMap<Person> {
    IndexedMap::new(person_registry())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animal {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub role: String,
    pub num_kind: i64,
}

impl Animal {
    pub fn new(id: i64, name: &str, kind: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind: kind.to_string(),
            role: String::new(),
            num_kind: 0,
        }
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.role = role.to_string();
        self
    }

    pub fn role_kind(&self) -> String {
        format!("{}:{}", self.role, self.kind)
    }
}

pub fn animal_registry() -> IndexRegistry<Animal> {
    IndexRegistry::builder()
        .index("Type", |a: &Animal| a.kind.clone())
        .index("Role", |a: &Animal| a.role.clone())
        .index("NumType", |a: &Animal| a.num_kind.to_string())
        .index("RoleType", |a: &Animal| a.role_kind())
        .build()
        .expect("valid animal registry")
}

pub fn animal_map() -> IndexedMap<Animal> {
    IndexedMap::new(animal_registry())
}

/// `n` animals with ids `offset..offset + n`, alternating "two" (even) and "one" (odd)
pub fn animals(offset: i64, n: i64) -> Vec<Animal> {
    (offset..offset + n)
        .map(|id| {
            let kind = if id % 2 == 0 { "two" } else { "one" };
            Animal::new(id, &format!("animal{}", id), kind)
        })
        .collect()
}

/// Names sorted, for order-independent comparisons
pub fn sorted_names<I: IntoIterator<Item = Animal>>(animals: I) -> Vec<String> {
    let mut names: Vec<String> = animals.into_iter().map(|a| a.name).collect();
    names.sort();
    names
}
