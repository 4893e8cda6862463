// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery targets for buffered items.

use crate::id::StreamTag;
use crate::item::Item;
use tokio::sync::{mpsc, oneshot};

/// How buffered items reach the caller.
#[derive(Debug, Default)]
pub enum Delivery {
    /// Nothing installed; items stay buffered until the caller pulls.
    #[default]
    None,
    /// A pending call, completed once with everything buffered so far.
    Reply(oneshot::Sender<Vec<Item>>),
    /// Each item sent individually, wrapped with the caller's tag.
    Tagged(mpsc::UnboundedSender<Tagged>, StreamTag),
    /// Each item sent individually, unwrapped.
    Raw(mpsc::UnboundedSender<Item>),
}

/// An item on a tagged stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Tagged {
    pub tag: StreamTag,
    pub item: Item,
}

impl Delivery {
    /// Reply target plus the receiver the caller awaits.
    pub fn reply() -> (Self, oneshot::Receiver<Vec<Item>>) {
        let (tx, rx) = oneshot::channel();
        (Delivery::Reply(tx), rx)
    }

    /// Tagged stream target plus its receiver.
    pub fn tagged(tag: StreamTag) -> (Self, mpsc::UnboundedReceiver<Tagged>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Delivery::Tagged(tx, tag), rx)
    }

    /// Raw stream target plus its receiver.
    pub fn raw() -> (Self, mpsc::UnboundedReceiver<Item>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Delivery::Raw(tx), rx)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Delivery::None)
    }
}

crate::simple_display! {
    Delivery {
        None => "none",
        Reply(..) => "reply",
        Tagged(..) => "tagged",
        Raw(..) => "raw",
    }
}
