//! Peer-connected value cells.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

struct Node<T> {
    value: Cell<T>,
    peers: RefCell<Vec<Weak<Node<T>>>>,
}

/// A value cell that can be connected to peer cells of the same kind.
///
/// `set` assigns the value to this node and to every transitively reachable
/// peer. Peers are assigned silently (they do not re-notify), so connection
/// graphs with cycles are safe.
pub struct Shared<T: Copy> {
    node: Rc<Node<T>>,
}

impl<T: Copy> Shared<T> {
    pub fn new(value: T) -> Self {
        Shared {
            node: Rc::new(Node {
                value: Cell::new(value),
                peers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.node.value.get()
    }

    /// Assign `value` here and on every connected peer.
    pub fn set(&self, value: T) {
        self.node.value.set(value);
        let mut visited: Vec<*const Node<T>> = vec![Rc::as_ptr(&self.node)];
        let mut queue: Vec<Rc<Node<T>>> = upgraded_peers(&self.node);
        while let Some(node) = queue.pop() {
            let ptr = Rc::as_ptr(&node);
            if visited.contains(&ptr) {
                continue;
            }
            visited.push(ptr);
            node.value.set(value);
            queue.extend(upgraded_peers(&node));
        }
    }

    /// Subscribe `self` and `other` to each other. Idempotent; connecting a
    /// node to itself is a no-op. Values are left untouched until the next
    /// `set` on either side.
    pub fn connect(&self, other: &Shared<T>) {
        if Rc::ptr_eq(&self.node, &other.node) {
            return;
        }
        attach(&self.node, &other.node);
        attach(&other.node, &self.node);
    }
}

impl<T: Copy> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared {
            node: Rc::clone(&self.node),
        }
    }
}

fn upgraded_peers<T: Copy>(node: &Rc<Node<T>>) -> Vec<Rc<Node<T>>> {
    node.peers
        .borrow()
        .iter()
        .filter_map(Weak::upgrade)
        .collect()
}

fn attach<T: Copy>(node: &Rc<Node<T>>, peer: &Rc<Node<T>>) {
    let mut peers = node.peers.borrow_mut();
    peers.retain(|w| w.upgrade().is_some());
    if peers
        .iter()
        .filter_map(Weak::upgrade)
        .any(|p| Rc::ptr_eq(&p, peer))
    {
        return;
    }
    peers.push(Rc::downgrade(peer));
}
