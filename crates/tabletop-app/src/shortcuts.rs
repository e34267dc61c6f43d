//! Keyboard shortcut registry and documentation.

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+D").
    pub fn format(&self) -> String {
        if self.ctrl {
            format!("Ctrl+{}", self.key)
        } else {
            self.key.to_string()
        }
    }
}

/// Registry of all keyboard and mouse shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("C", true, "Copy selected image"),
            Shortcut::new("V", true, "Paste copied image or clipboard image"),
            Shortcut::new("D", true, "Duplicate selected image"),
            Shortcut::new("Z", true, "Undo last drawing"),
            Shortcut::new("Delete", false, "Delete selected image"),
            Shortcut::new("Escape", false, "Close menus and deselect"),
            Shortcut::new("G", false, "Deselect"),
            Shortcut::new("S", false, "Select tool"),
            Shortcut::new("D", false, "Pen"),
            Shortcut::new("E", false, "Eraser"),
            Shortcut::new("1", false, "Line"),
            Shortcut::new("2", false, "Circle"),
            Shortcut::new("3", false, "Rectangle"),
            Shortcut::new("R", false, "Ruler"),
            Shortcut::new("Space+Drag", false, "Pan the view"),
            Shortcut::new("Ctrl+Wheel", false, "Rotate selected image"),
            Shortcut::new("Shift+Wheel", false, "Scale selected image"),
            Shortcut::new("Triple-click", false, "Edit note"),
        ]
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}
