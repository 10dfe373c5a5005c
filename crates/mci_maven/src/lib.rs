// mci_maven - pom.xml reader for the compiler import engine
mod pom;

pub use pom::{MavenProject, PomError};

use mci_import::ModuleRef;

/// Main and test modules an IDE creates for a Maven project by default.
pub fn default_modules(project: &MavenProject) -> Vec<ModuleRef> {
    if project.is_pom_packaging() {
        return vec![ModuleRef::main(project.artifact_id.clone())];
    }
    vec![
        ModuleRef::main(project.artifact_id.clone()),
        ModuleRef::test(format!("{}.test", project.artifact_id)),
    ]
}
