use crate::error::{Result, TallyError};
use crate::models::{
    round_to_cents, truncate_to_millis, Expense, NewExpense, MAX_AMOUNT, NOTE_MAX_CHARS,
};
use crate::storage::{load_expenses, save_expenses, KeyValueStore};

/// Owns the in-memory expense list and the backend it is persisted to.
///
/// The list is always sorted newest first. Every mutation writes the whole
/// list back through [`save_expenses`]; a failed write is logged, the
/// in-memory list stays authoritative and [`ExpenseStore::last_save_ok`]
/// turns false.
pub struct ExpenseStore<S: KeyValueStore> {
    backend: S,
    expenses: Vec<Expense>,
    saved: bool,
}

fn validate_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(TallyError::Validation(format!(
            "amount must be a positive number, got {amount}"
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(TallyError::Validation(format!(
            "amount {amount} is over the limit of {MAX_AMOUNT}"
        )));
    }
    let rounded = round_to_cents(amount);
    if rounded <= 0.0 {
        return Err(TallyError::Validation(format!(
            "amount rounds to zero: {amount}"
        )));
    }
    Ok(rounded)
}

fn validate_note(note: &str) -> Result<String> {
    let note = note.trim();
    let len = note.chars().count();
    if len > NOTE_MAX_CHARS {
        return Err(TallyError::Validation(format!(
            "note is {len} characters, the limit is {NOTE_MAX_CHARS}"
        )));
    }
    Ok(note.to_string())
}

fn sort_newest_first(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| b.date.cmp(&a.date));
}

impl<S: KeyValueStore> ExpenseStore<S> {
    /// Load the collection from `backend`. Records that were given a fresh
    /// id while loading are written back so the id stays put.
    pub fn open(backend: S) -> Self {
        let loaded = load_expenses(&backend);
        let mut store = Self {
            backend,
            expenses: loaded.expenses,
            saved: true,
        };
        sort_newest_first(&mut store.expenses);
        if loaded.assigned_ids > 0 {
            tracing::info!(count = loaded.assigned_ids, "Persisting newly assigned ids");
            store.persist();
        }
        store
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    /// Resolve a full id or a unique id prefix, as typed on the command line.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<&Expense> {
        if prefix.is_empty() {
            return Err(TallyError::Other("an id or id prefix is required".to_string()));
        }
        if let Some(exact) = self.get(prefix) {
            return Ok(exact);
        }
        let mut hits = self.expenses.iter().filter(|e| e.id.starts_with(prefix));
        match (hits.next(), hits.next()) {
            (Some(only), None) => Ok(only),
            (Some(_), _) => Err(TallyError::Other(format!(
                "id prefix '{prefix}' matches more than one expense"
            ))),
            (None, _) => Err(TallyError::NotFound(prefix.to_string())),
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Whether the most recent write reached the backend.
    pub fn last_save_ok(&self) -> bool {
        self.saved
    }

    fn persist(&mut self) {
        self.saved = save_expenses(&mut self.backend, &self.expenses);
    }

    pub fn add(&mut self, new: NewExpense) -> Result<Expense> {
        let expense = Expense {
            id: uuid::Uuid::new_v4().to_string(),
            amount: validate_amount(new.amount)?,
            category: new.category,
            note: validate_note(&new.note)?,
            date: truncate_to_millis(new.date),
        };
        tracing::debug!(id = %expense.id, amount = expense.amount, "Adding expense");

        self.expenses.push(expense.clone());
        sort_newest_first(&mut self.expenses);
        self.persist();
        Ok(expense)
    }

    /// Remove the expense with `id`. Returns whether anything was removed;
    /// the list is written back either way.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != id);
        let removed = self.expenses.len() != before;
        tracing::debug!(id, removed, "Deleting expense");
        self.persist();
        removed
    }

    /// Replace the stored expense that has the same id with `expense`.
    ///
    /// Returns `Ok(false)` without writing anything when no expense has that
    /// id.
    pub fn update(&mut self, expense: Expense) -> Result<bool> {
        let amount = validate_amount(expense.amount)?;
        let note = validate_note(&expense.note)?;

        let Some(slot) = self.expenses.iter_mut().find(|e| e.id == expense.id) else {
            tracing::warn!(id = %expense.id, "Ignoring update for unknown expense");
            return Ok(false);
        };
        *slot = Expense {
            amount,
            note,
            date: truncate_to_millis(expense.date),
            ..expense
        };
        tracing::debug!(id = %slot.id, "Updated expense");

        sort_newest_first(&mut self.expenses);
        self.persist();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_instant, Category};
    use crate::storage::{MemoryStore, EXPENSES_KEY};

    fn new_expense(amount: f64, category: Category, date: &str) -> NewExpense {
        NewExpense {
            amount,
            category,
            note: String::new(),
            date: parse_instant(date).unwrap(),
        }
    }

    fn stored(store: &ExpenseStore<MemoryStore>) -> Vec<Expense> {
        load_expenses(store.backend()).expenses
    }

    /// Reads fine, refuses every write.
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(TallyError::Other("read-only".into()))
        }
    }

    #[test]
    fn test_open_sorts_loaded_expenses() {
        let mut backend = MemoryStore::new();
        backend
            .set(
                EXPENSES_KEY,
                r#"[
                    {"id": "old", "amount": 1, "category": "Food", "note": "", "date": "2024-01-01"},
                    {"id": "new", "amount": 2, "category": "Food", "note": "", "date": "2024-06-01"}
                ]"#,
            )
            .unwrap();
        let store = ExpenseStore::open(backend);
        let ids: Vec<&str> = store.expenses().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn test_add_sorts_newest_first_in_either_order() {
        for dates in [["2024-03-01", "2024-03-15"], ["2024-03-15", "2024-03-01"]] {
            let mut store = ExpenseStore::open(MemoryStore::new());
            for date in dates {
                store.add(new_expense(5.0, Category::Food, date)).unwrap();
            }
            let expenses = store.expenses();
            assert!(expenses.windows(2).all(|w| w[0].date >= w[1].date));
            assert_eq!(stored(&store), expenses);
        }
    }

    #[test]
    fn test_add_assigns_id_and_rounds_amount() {
        let mut store = ExpenseStore::open(MemoryStore::new());
        let mut new = new_expense(12.499, Category::Shopping, "2024-03-01T10:00:00.123456Z");
        new.note = "  socks  ".into();
        let a = store.add(new).unwrap();
        let b = store.add(new_expense(1.0, Category::Food, "2024-03-02")).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.amount, 12.5);
        assert_eq!(a.note, "socks");
        assert_eq!(a.date.timestamp_subsec_millis(), 123);
        assert_eq!(a.date.timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn test_add_rejects_invalid_amounts_and_long_notes() {
        let mut store = ExpenseStore::open(MemoryStore::new());
        for amount in [0.0, -3.0, f64::NAN, f64::INFINITY, 0.001, MAX_AMOUNT + 1.0, 6e16] {
            let err = store.add(new_expense(amount, Category::Food, "2024-03-01"));
            assert!(matches!(err, Err(TallyError::Validation(_))), "accepted {amount}");
        }
        let mut long = new_expense(1.0, Category::Food, "2024-03-01");
        long.note = "x".repeat(NOTE_MAX_CHARS + 1);
        assert!(matches!(store.add(long), Err(TallyError::Validation(_))));

        let mut exact = new_expense(1.0, Category::Food, "2024-03-01");
        exact.note = "字".repeat(NOTE_MAX_CHARS);
        assert!(store.add(exact).is_ok());
        assert!(store.add(new_expense(MAX_AMOUNT, Category::Other, "2024-03-01")).is_ok());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_delete_removes_and_persists() {
        let mut store = ExpenseStore::open(MemoryStore::new());
        let a = store.add(new_expense(5.0, Category::Food, "2024-03-01")).unwrap();
        store.add(new_expense(6.0, Category::Food, "2024-03-02")).unwrap();

        assert!(store.delete(&a.id));
        assert!(store.get(&a.id).is_none());
        assert!(stored(&store).iter().all(|e| e.id != a.id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let mut store = ExpenseStore::open(MemoryStore::new());
        store.add(new_expense(5.0, Category::Food, "2024-03-01")).unwrap();
        let before = store.expenses().to_vec();
        assert!(!store.delete("nope"));
        assert_eq!(store.expenses(), before.as_slice());
        assert_eq!(stored(&store), before);
    }

    #[test]
    fn test_update_replaces_full_record_and_resorts() {
        let mut store = ExpenseStore::open(MemoryStore::new());
        let a = store.add(new_expense(5.0, Category::Food, "2024-03-01")).unwrap();
        store.add(new_expense(6.0, Category::Food, "2024-03-02")).unwrap();

        let edited = Expense {
            amount: 8.456,
            category: Category::Entertainment,
            note: "cinema".into(),
            date: parse_instant("2024-03-20").unwrap(),
            ..a.clone()
        };
        assert!(store.update(edited).unwrap());

        let first = &store.expenses()[0];
        assert_eq!(first.id, a.id);
        assert_eq!(first.amount, 8.46);
        assert_eq!(first.category, Category::Entertainment);
        assert_eq!(stored(&store), store.expenses());
    }

    #[test]
    fn test_update_unknown_id_is_ignored() {
        let mut store = ExpenseStore::open(MemoryStore::new());
        store.add(new_expense(5.0, Category::Food, "2024-03-01")).unwrap();
        let ghost = Expense {
            id: "ghost".into(),
            amount: 1.0,
            category: Category::Other,
            note: String::new(),
            date: parse_instant("2024-03-01").unwrap(),
        };
        assert!(!store.update(ghost).unwrap());
        assert_eq!(store.len(), 1);
        assert_eq!(stored(&store).len(), 1);
    }

    #[test]
    fn test_update_rejects_invalid_amount() {
        let mut store = ExpenseStore::open(MemoryStore::new());
        let a = store.add(new_expense(5.0, Category::Food, "2024-03-01")).unwrap();
        let bad = Expense { amount: -1.0, ..a.clone() };
        assert!(matches!(store.update(bad), Err(TallyError::Validation(_))));
        assert_eq!(store.get(&a.id).unwrap().amount, 5.0);
    }

    #[test]
    fn test_find_by_prefix() {
        let mut store = ExpenseStore::open(MemoryStore::new());
        let a = store.add(new_expense(5.0, Category::Food, "2024-03-01")).unwrap();
        assert_eq!(store.find_by_prefix(&a.id[..8]).unwrap().id, a.id);
        assert_eq!(store.find_by_prefix(&a.id).unwrap().id, a.id);
        assert!(matches!(store.find_by_prefix("zzzz"), Err(TallyError::NotFound(_))));
        assert!(store.find_by_prefix("").is_err());
    }

    #[test]
    fn test_empty_prefix_is_rejected_with_one_expense() {
        let mut store = ExpenseStore::open(MemoryStore::new());
        store.add(new_expense(5.0, Category::Food, "2024-03-01")).unwrap();
        match store.find_by_prefix("") {
            Err(TallyError::Other(msg)) => assert!(!msg.contains("more than one")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_assigned_ids_survive_reopening() {
        let mut backend = MemoryStore::new();
        backend
            .set(
                EXPENSES_KEY,
                r#"[{"amount": 4, "category": "Food", "note": "no id", "date": "2024-03-01"}]"#,
            )
            .unwrap();

        let first = ExpenseStore::open(backend);
        let id = first.expenses()[0].id.clone();
        assert!(first.last_save_ok());

        let mut second = ExpenseStore::open(first.backend().clone());
        assert_eq!(second.expenses()[0].id, id);
        assert!(second.delete(&id));
        assert!(second.is_empty());
    }

    #[test]
    fn test_failed_write_is_reported() {
        let mut store = ExpenseStore::open(ReadOnlyStore(MemoryStore::new()));
        assert!(store.last_save_ok());

        let added = store.add(new_expense(5.0, Category::Food, "2024-03-01")).unwrap();
        assert!(!store.last_save_ok());
        assert_eq!(store.len(), 1);

        store.delete(&added.id);
        assert!(!store.last_save_ok());
    }
}
