pub mod carried_over_todo;
pub mod journal;
pub mod mistake;
pub mod overthinking;
pub mod todo;

pub use carried_over_todo::Entity as CarriedOverTodo;
pub use journal::Entity as JournalEntry;
pub use mistake::Entity as Mistake;
pub use overthinking::Entity as Overthinking;
pub use todo::Entity as Todo;
