// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Glyphpen: replay scripted pen gestures on a packed path

fn main() -> anyhow::Result<()> {
    glyphpen::run()
}
