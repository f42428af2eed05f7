use crate::cli::{open_store, warn_if_unsaved};
use crate::error::{Result, TallyError};
use crate::fmt::short_id;

pub fn run(id: &str) -> Result<()> {
    let mut store = open_store()?;
    let full_id = match store.find_by_prefix(id) {
        Ok(expense) => expense.id.clone(),
        Err(TallyError::NotFound(_)) => {
            println!("No expense matches {id}; nothing deleted.");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    store.delete(&full_id);
    println!("Deleted {}", short_id(&full_id));
    warn_if_unsaved(&store);
    Ok(())
}
