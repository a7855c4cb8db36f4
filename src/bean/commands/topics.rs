use crate::commands::CmdResult;
use crate::error::{Context, Result};
use crate::store::CardStore;

pub fn run<S: CardStore>(store: &S) -> Result<CmdResult> {
    let topics = store
        .topic_list()
        .with_context(|| "list topics".to_string())?;
    Ok(CmdResult::default().with_topics(topics))
}
