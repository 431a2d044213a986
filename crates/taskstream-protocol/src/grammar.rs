// Wire markers of the agent event stream. Must match the backend exactly.
//
//   ===EVENT:<name>===
//   ---<label>---
//   <markdown body>
//   ===END===

/// Opens an event; the event name follows up to the closing `===`.
pub const EVENT_OPEN: &str = "===EVENT:";

/// Terminates an event. Everything up to here belongs to the event.
pub const EVENT_CLOSE: &str = "===END===";

/// Closes the event header line (`===EVENT:<name>===`).
pub const HEADER_FENCE: &str = "===";

/// Surrounds a block label on its own line (`---<label>---`).
pub const LABEL_FENCE: &str = "---";
