// SPDX-License-Identifier: MIT
// Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.

// Storage API:
// Single entry type Grid which is generic over its storage.
// - Only expose a minimal subset to interact with the grid over the storage API.
// - Implementing new storage types is a lot easier.
//
// Generalised to cells that may be absent (pinched-out gridblocks) and need
// not be `Copy` (a gridblock owns `Vec`s and `Rc`s). `get`/`get_mut` therefore
// return `Option<&T>`/`Option<&mut T>` rather than an unconditional reference.
use crate::prelude::PointIndex;

pub trait Storage<T> {
    fn get(&self, p: PointIndex) -> Option<&T>;
    fn get_mut(&mut self, p: PointIndex) -> Option<&mut T>;
    fn set(&mut self, p: PointIndex, elem: Option<T>);
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;
}
