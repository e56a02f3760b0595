//! Sibling app registry

use serde::{Deserialize, Serialize};

pub const ECOSYSTEM_DOMAIN: &str = "gml-ecosystem.com";

/// Where the sibling apps are served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Production,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiblingApp {
    pub name: &'static str,
    pub path: &'static str,
    pub port: u16,
    /// Content kinds the app produces
    pub exports: &'static [&'static str],
}

impl SiblingApp {
    pub fn url(&self, environment: Environment, domain: &str) -> String {
        match environment {
            Environment::Local => format!("http://localhost:{}", self.port),
            Environment::Production => format!("https://{}.{}", self.path, domain),
        }
    }
}

const STANDARD_APPS: [SiblingApp; 5] = [
    SiblingApp { name: "RiffGen", path: "gml-riffgen", port: 3001, exports: &["riffs", "patterns", "motifs"] },
    SiblingApp { name: "TriadGen", path: "triadgen", port: 3002, exports: &["triads", "progressions"] },
    SiblingApp {
        name: "QuartetEngine",
        path: "quartet-engine",
        port: 3003,
        exports: &["scores", "parts", "arrangements"],
    },
    SiblingApp {
        name: "QuintetComposer",
        path: "quintet-composer",
        port: 3004,
        exports: &["compositions", "ensembles"],
    },
    SiblingApp { name: "GML-ACE", path: "gml-ace", port: 3005, exports: &["advanced", "orchestrations"] },
];

#[derive(Debug, Clone)]
pub struct AppRegistry {
    apps: Vec<SiblingApp>,
    domain: String,
}

impl Default for AppRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl AppRegistry {
    pub fn standard() -> Self {
        Self {
            apps: STANDARD_APPS.to_vec(),
            domain: ECOSYSTEM_DOMAIN.to_string(),
        }
    }

    pub fn apps(&self) -> &[SiblingApp] {
        &self.apps
    }

    pub fn get(&self, name: &str) -> Option<&SiblingApp> {
        self.apps.iter().find(|app| app.name == name)
    }

    /// Base URL of a sibling app, `None` for an unknown name
    pub fn url_for(&self, name: &str, environment: Environment) -> Option<String> {
        self.get(name).map(|app| app.url(environment, &self.domain))
    }
}
