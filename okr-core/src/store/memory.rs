//! In-memory [`HierarchyStore`] for tests and fakes.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use super::{HierarchyStore, InitiativePatch, KeyResultPatch, ObjectivePatch};
use crate::error::{Error, Result};
use crate::models::*;

/// One record kind: rows by id plus insertion order for stable iteration.
struct Table<T> {
    rows: HashMap<Uuid, T>,
    order: Vec<Uuid>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn insert(&mut self, id: Uuid, row: T) -> Result<Uuid> {
        if self.rows.contains_key(&id) {
            return Err(Error::Storage(format!("duplicate id: {}", id)));
        }
        self.rows.insert(id, row);
        self.order.push(id);
        Ok(id)
    }

    fn get(&self, id: Uuid) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.order
            .iter()
            .filter_map(|id| self.rows.get(id))
            .filter(|row| pred(row))
            .cloned()
            .collect()
    }

    fn update(&mut self, id: Uuid, apply: impl FnOnce(&mut T)) -> usize {
        match self.rows.get_mut(&id) {
            Some(row) => {
                apply(row);
                1
            }
            None => 0,
        }
    }

    fn remove_where(&mut self, pred: impl Fn(&T) -> bool) -> usize {
        let before = self.rows.len();
        self.rows.retain(|_, row| !pred(row));
        let rows = &self.rows;
        self.order.retain(|id| rows.contains_key(id));
        before - self.rows.len()
    }
}

/// Map-backed store. Each call takes one lock; nothing spans calls.
pub struct InMemoryStore {
    objectives: RwLock<Table<Objective>>,
    key_results: RwLock<Table<KeyResult>>,
    initiatives: RwLock<Table<Initiative>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            objectives: RwLock::new(Table::new()),
            key_results: RwLock::new(Table::new()),
            initiatives: RwLock::new(Table::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| Error::Storage("lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| Error::Storage("lock poisoned".into()))
}

impl HierarchyStore for InMemoryStore {
    fn insert_objective(&self, objective: &Objective) -> Result<Uuid> {
        write(&self.objectives)?.insert(objective.id, objective.clone())
    }

    fn find_objective(&self, id: Uuid) -> Result<Option<Objective>> {
        Ok(read(&self.objectives)?.get(id))
    }

    fn list_objectives(&self) -> Result<Vec<Objective>> {
        Ok(read(&self.objectives)?.filter(|_| true))
    }

    fn update_objective(&self, id: Uuid, patch: &ObjectivePatch) -> Result<usize> {
        Ok(write(&self.objectives)?.update(id, |o| patch.apply(o)))
    }

    fn delete_objective(&self, id: Uuid) -> Result<usize> {
        Ok(write(&self.objectives)?.remove_where(|o| o.id == id))
    }

    fn insert_key_result(&self, key_result: &KeyResult) -> Result<Uuid> {
        write(&self.key_results)?.insert(key_result.id, key_result.clone())
    }

    fn find_key_result(&self, id: Uuid) -> Result<Option<KeyResult>> {
        Ok(read(&self.key_results)?.get(id))
    }

    fn find_key_results_by_objective(&self, objective_id: Uuid) -> Result<Vec<KeyResult>> {
        Ok(read(&self.key_results)?.filter(|kr| kr.objective_id == objective_id))
    }

    fn update_key_result(&self, id: Uuid, patch: &KeyResultPatch) -> Result<usize> {
        Ok(write(&self.key_results)?.update(id, |kr| patch.apply(kr)))
    }

    fn delete_key_result(&self, id: Uuid) -> Result<usize> {
        Ok(write(&self.key_results)?.remove_where(|kr| kr.id == id))
    }

    fn delete_key_results_by_objective(&self, objective_id: Uuid) -> Result<usize> {
        Ok(write(&self.key_results)?.remove_where(|kr| kr.objective_id == objective_id))
    }

    fn count_key_results_by_objective(&self, objective_id: Uuid) -> Result<usize> {
        Ok(read(&self.key_results)?
            .filter(|kr| kr.objective_id == objective_id)
            .len())
    }

    fn insert_initiative(&self, initiative: &Initiative) -> Result<Uuid> {
        write(&self.initiatives)?.insert(initiative.id, initiative.clone())
    }

    fn find_initiative(&self, id: Uuid) -> Result<Option<Initiative>> {
        Ok(read(&self.initiatives)?.get(id))
    }

    fn find_initiatives_by_key_result(&self, key_result_id: Uuid) -> Result<Vec<Initiative>> {
        Ok(read(&self.initiatives)?.filter(|i| i.key_result_id == key_result_id))
    }

    fn update_initiative(&self, id: Uuid, patch: &InitiativePatch) -> Result<usize> {
        Ok(write(&self.initiatives)?.update(id, |i| patch.apply(i)))
    }

    fn delete_initiative(&self, id: Uuid) -> Result<usize> {
        Ok(write(&self.initiatives)?.remove_where(|i| i.id == id))
    }

    fn delete_initiatives_by_key_result(&self, key_result_id: Uuid) -> Result<usize> {
        Ok(write(&self.initiatives)?.remove_where(|i| i.key_result_id == key_result_id))
    }

    fn count_initiatives_by_key_result(&self, key_result_id: Uuid) -> Result<usize> {
        Ok(read(&self.initiatives)?
            .filter(|i| i.key_result_id == key_result_id)
            .len())
    }
}
