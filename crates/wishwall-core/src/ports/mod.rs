//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod store;

pub use store::{
    ChangeEvent, ChangeHandler, ChangeKind, Direction, Filter, OrderBy, RemoteStore, Row,
    Subscription, Table,
};
