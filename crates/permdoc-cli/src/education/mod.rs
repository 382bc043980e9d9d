//! Educational features: explanations of what each check looks at.

use colored::Colorize;
use permdoc::TargetHint;

/// Command explanation builder.
pub struct Explain {
    description: String,
    what_happens: Vec<String>,
    try_yourself: Vec<String>,
}

impl Explain {
    fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            what_happens: Vec::new(),
            try_yourself: Vec::new(),
        }
    }

    fn step(mut self, step: &str) -> Self {
        self.what_happens.push(step.to_string());
        self
    }

    fn manual(mut self, command: &str) -> Self {
        self.try_yourself.push(command.to_string());
        self
    }

    /// Print the explanation to stdout.
    pub fn print(&self) {
        println!();
        println!("{}", "=== What This Does ===".bold().cyan());
        println!("{}", self.description);
        println!();

        if !self.what_happens.is_empty() {
            println!("{}", "How it works:".bold());
            for (i, step) in self.what_happens.iter().enumerate() {
                println!("  {}. {}", i + 1, step);
            }
            println!();
        }

        if !self.try_yourself.is_empty() {
            println!("{}", "Check it by hand:".bold());
            for cmd in &self.try_yourself {
                println!("  {}", format!("$ {cmd}").dimmed());
            }
            println!();
        }

        println!("{}", "=== Results ===".bold().cyan());
        println!();
    }

    /// Lines of the "How it works" list.
    pub fn steps(&self) -> &[String] {
        &self.what_happens
    }

    // ========================================================================
    // Factory methods for each command
    // ========================================================================

    pub fn check(target: &str, hint: TargetHint) -> Self {
        let mut explain = Self::new(&format!(
            "Works out whether you can access '{target}' and, if not, what to change."
        ));

        if hint == TargetHint::AsCommand {
            explain = explain
                .step("Walks PATH left to right; the first directory holding a regular file with this name wins")
                .step("Audits PATH itself: empty entries mean the current directory, relative entries move with you")
                .manual(&format!("type -a {target}"));
        }

        explain
            .step("Checks that the path exists at all")
            .step("Follows symlinks hop by hop (giving up after 40) and judges the final target")
            .step("Picks exactly ONE permission triple: owner if you own it, else group if you are a member, else other")
            .step("A restrictive owner triple is not rescued by a generous group or other triple")
            .step("Checks the parent directory for execute (traverse) permission, which gates everything inside")
            .step("Notes hard links: a mode change applies to every name of the file")
            .manual("id")
            .manual(&format!("ls -ld {target}"))
            .manual(&format!("namei -l {target}"))
    }

    pub fn which(name: &str) -> Self {
        Self::new(&format!("Finds which file runs when you type '{name}'."))
            .step("Splits PATH on ':' keeping empty entries")
            .step("Looks for a regular file named like the command in each entry, in order")
            .step("Later matches are shadowed: the shell never reaches them")
            .step("Executability is not checked here; use 'permdoc check' for that")
            .manual(&format!("command -v {name}"))
            .manual(&format!("type -a {name}"))
    }

    pub fn path_audit() -> Self {
        Self::new("Audits the command search path (PATH) for common misconfigurations.")
            .step("Empty entries (leading, trailing or doubled ':') search the current directory")
            .step("Relative entries depend on where you are when you run a command")
            .step("Missing or non-directory entries are dead weight")
            .step("Duplicates are harmless but only the first copy is ever used")
            .manual("echo \"$PATH\" | tr ':' '\\n'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_check_explains_path_search() {
        let explain = Explain::check("ls", TargetHint::AsCommand);
        assert!(explain.steps()[0].contains("PATH"));
        let path_only = Explain::check("/etc/shadow", TargetHint::AsPath);
        assert!(path_only.steps().len() < explain.steps().len());
    }
}
