use tokio::sync::broadcast::{self, Sender};

use crate::auth::events::SessionEvent;


const BUFFER_SIZE: usize = 50;
pub fn run() -> Sender<SessionEvent> {
    let (session_sender, _) = broadcast::channel(BUFFER_SIZE);
    session_sender
}
