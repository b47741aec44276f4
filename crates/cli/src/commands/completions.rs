// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gk completions <shell>` - Print a shell completion script
//!
//! ```bash
//! gk completions bash > ~/.local/share/bash-completion/completions/gk
//! gk completions zsh > ~/.zfunc/_gk
//! ```

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

#[derive(Args)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn completions<C: CommandFactory>(args: CompletionsArgs) {
    let mut cmd = C::command();
    generate(args.shell, &mut cmd, "gk", &mut std::io::stdout());
}
