/// Static description of one expansion rule. Order in [`CATALOG`] breaks priority ties.
pub struct RuleSpec {
    pub name: &'static str,
    pub pattern: &'static str,
    pub priority: u32,
    pub keywords: &'static [&'static str],
    pub extensions: &'static [&'static str],
    pub recursive: bool,
    pub description: &'static str,
}

pub const CATALOG: &[RuleSpec] = &[
    RuleSpec {
        name: "admin",
        pattern: r"/(admin|administrator|administration|manage|manager|control|cpanel)",
        priority: 100,
        keywords: &[
            "login", "dashboard", "panel", "config", "users", "settings", "backup", "db",
            "database", "cpanel", "phpmyadmin", "adminer", "console", "portal", "system",
            "index", "home", "main", "users/list", "users/add", "users/edit", "users/delete",
            "settings/general", "settings/security", "settings/backup", "logs", "audit",
            "reports", "analytics", "stats",
        ],
        extensions: &["php", "asp", "aspx", "jsp", "do", "action"],
        recursive: true,
        description: "Administrative interfaces",
    },
    RuleSpec {
        name: "api",
        pattern: r"/(api|rest|graphql|endpoint|service|v\d+)",
        priority: 90,
        keywords: &[
            "swagger.json", "openapi.yaml", "openapi.json", "api-docs", "v1", "v2", "v3",
            "latest", "users", "auth", "authentication", "token", "tokens", "refresh", "login",
            "logout", "register", "graphql", "query", "mutation", "subscription", "schema",
            "docs", "documentation", "health", "healthcheck", "status", "metrics", "info",
            "version", "ping", "heartbeat", "users/me", "users/profile", "users/list",
            "users/search", "auth/login", "auth/refresh", "auth/verify", "auth/forgot",
            "search", "filter", "sort", "paginate", "export", "import",
        ],
        extensions: &["json", "yaml", "yml", "xml"],
        recursive: true,
        description: "REST, GraphQL and SOAP endpoints",
    },
    RuleSpec {
        name: "dev",
        pattern: r"/(dev|development|debug|test|testing|stage|staging|beta|alpha)",
        priority: 85,
        keywords: &[
            "test", "staging", "beta", "debug", "dev.zip", "backup.zip", ".git", ".svn", ".hg",
            ".bzr", "composer.json", "package.json", "phpinfo.php", "info.php", "test.php",
            "debug.php", "env.php", "config.php", "configuration.php", "settings.php",
            "setup.php", "install", "installer", "setup", "migration", "update", "console",
            "shell", "terminal", "cmd", "exec", "eval", "logs", "log", "error_log", "debug.log",
            "app.log", "stacktrace", "trace", "dump", "var_dump", "print_r",
        ],
        extensions: &["php", "log", "txt", "zip", "tar", "gz", "sql"],
        recursive: true,
        description: "Development and debug endpoints",
    },
    RuleSpec {
        name: "backup",
        pattern: r"/(backup|bak|back|save|old|archive|dump)",
        priority: 85,
        keywords: &[
            "db.sql", "database.sql", "dump.sql", "backup.sql", "site.zip", "website.zip",
            "www.zip", "public_html.zip", "site.tar.gz", "backup.tar.gz", "archive.tar.gz",
            "backup.tar", "backup.rar", "backup.7z", "code-old", "site-old", "www-old",
            "admin-old", "wp-backup.zip", "wordpress.zip", "joomla.zip", ".bak", ".old",
            ".save", ".orig", ".original", "yesterday", "latest", "current", "previous",
            "2023", "2024", "2025", "backup_2024", "backup_2025",
        ],
        extensions: &["sql", "zip", "tar", "gz", "rar", "7z", "bak", "old"],
        recursive: true,
        description: "Backup and archive files",
    },
    RuleSpec {
        name: "vcs",
        pattern: r"/(\.git|\.svn|\.hg|CVS|\.bzr|_darcs)",
        priority: 80,
        keywords: &[
            "HEAD", "config", "index", "objects", "refs", "logs", "COMMIT_EDITMSG",
            "description", "hooks", "info", "branches", "tags", "master", "main", "develop",
            ".gitignore", ".gitmodules", ".gitattributes", "entries", "all-wcprops", "props",
            "text-base", "prop-base", "pristine", "wc.db", "format",
        ],
        extensions: &[],
        recursive: true,
        description: "Version control metadata",
    },
    RuleSpec {
        name: "auth",
        pattern: r"/(login|signin|auth|authenticate|sso|oauth|saml)",
        priority: 75,
        keywords: &[
            "auth", "authenticate", "authorization", "reset", "forgot", "forgot-password",
            "reset-password", "change-password", "2fa", "two-factor", "mfa", "verify",
            "verification", "otp", "one-time", "check", "validate", "token", "callback",
            "redirect", "return", "success", "failure", "register", "signup",
            "create-account", "join", "logout", "signout", "exit", "disconnect", "session",
            "cookie", "remember", "persistent",
        ],
        extensions: &["php", "asp", "aspx", "jsp", "html"],
        recursive: true,
        description: "Authentication and session endpoints",
    },
    RuleSpec {
        name: "cms",
        pattern: r"/(wordpress|wp|joomla|drupal|typo3|magento|prestashop|opencart)",
        priority: 70,
        keywords: &[
            "wp-admin", "wp-login.php", "wp-content", "wp-includes", "wp-json", "xmlrpc.php",
            "wp-cron.php", "wp-config.php", "administrator", "admin.php", "configuration.php",
            "components", "modules", "plugins", "templates", "sites/default", "user/login",
            "admin/config", "index.php/admin", "backend", "adminhtml", "media", "var",
            "pub/static", "setup",
        ],
        extensions: &["php"],
        recursive: true,
        description: "Content management system paths",
    },
    RuleSpec {
        name: "config",
        pattern: r"/(config|configuration|settings|setup|install)",
        priority: 75,
        keywords: &[
            "config.php", "configuration.php", "settings.php", "config.json", "settings.json",
            "parameters.json", "config.yml", "config.yaml", "application.yml", ".env",
            ".env.local", ".env.production", ".env.development", "database.ini", "db.ini",
            "database.php", "database.yml", "local.settings.php", "settings.local.php",
            "app.config", "web.config", "machine.config", "parameters.yml", "parameters.ini",
            "secrets.yml",
        ],
        extensions: &["php", "json", "yml", "yaml", "ini", "xml", "conf"],
        recursive: true,
        description: "Configuration and settings files",
    },
    RuleSpec {
        name: "uploads",
        pattern: r"/(upload|uploads|files|media|static|assets|content|resources)",
        priority: 65,
        keywords: &[
            "test.jpg", "test.png", "test.txt", "test.pdf", "shell.php", "cmd.php", "c99.php",
            "r57.php", "old.zip", "backup.zip", "files.zip", "data.zip", ".env", ".htaccess",
            ".htpasswd", "web.config", "logs", "error.log", "access.log", "debug.log", "temp",
            "tmp", "cache", "sessions", "images", "documents", "downloads", "attachments",
            "avatar", "profile", "user_uploads",
        ],
        extensions: &["jpg", "png", "gif", "pdf", "zip", "txt", "log"],
        recursive: true,
        description: "Upload and static file directories",
    },
    RuleSpec {
        name: "monitoring",
        pattern: r"/(monitor|monitoring|metrics|status|health|stats|statistics)",
        priority: 60,
        keywords: &[
            "metrics", "prometheus", "grafana", "status", "health", "healthcheck",
            "health-check", "alive", "ready", "live", "debug/pprof", "debug/vars",
            "debug/requests", "actuator", "actuator/health", "actuator/metrics",
            "actuator/info", "actuator/env", "actuator/beans", "_stats", "_cluster/health",
            "_nodes", "_status", "server-status", "nginx_status", "php-fpm/status", "apm",
            "trace", "profiler", "performance",
        ],
        extensions: &["json", "xml", "yml"],
        recursive: true,
        description: "Monitoring and metrics endpoints",
    },
    RuleSpec {
        name: "graphql",
        pattern: r"/graphql",
        priority: 70,
        keywords: &[
            "playground", "graphiql", "console", "explorer", "schema", "introspection", "query",
            "mutation", "subscription", "websocket", "ws", "altair", "voyager", "docs",
            "reference",
        ],
        extensions: &["json"],
        recursive: false,
        description: "GraphQL endpoints and tooling",
    },
    RuleSpec {
        name: "packages",
        pattern: r"/(vendor|node_modules|bower_components|packages)",
        priority: 70,
        keywords: &[
            "composer.json", "composer.lock", "installed.json", "package.json",
            "package-lock.json", "yarn.lock", "requirements.txt", "Pipfile", "Pipfile.lock",
            "Gemfile", "Gemfile.lock", "bower.json", ".npmrc", ".yarnrc", "lerna.json",
            "autoload.php", "bootstrap.php",
        ],
        extensions: &["json", "lock", "txt"],
        recursive: true,
        description: "Package manager manifests",
    },
    RuleSpec {
        name: "database",
        pattern: r"/(phpmyadmin|adminer|pgadmin|mongodb|redis|elasticsearch)",
        priority: 85,
        keywords: &[
            "index.php", "login.php", "db.php", "sql.php", "import.php", "export.php",
            "query.php", "setup", "install", "config", "upgrade", "console", "shell", "cli",
            "terminal",
        ],
        extensions: &["php"],
        recursive: true,
        description: "Database management interfaces",
    },
    RuleSpec {
        name: "hidden",
        pattern: r"/\.",
        priority: 75,
        keywords: &[
            ".env", ".env.local", ".env.prod", ".env.dev", ".git/config", ".gitignore",
            ".dockerignore", ".htaccess", ".htpasswd", ".user.ini", ".aws/credentials",
            ".ssh/id_rsa", ".ssh/known_hosts", ".docker/config.json", ".kube/config", ".npmrc",
            ".pypirc", ".netrc", ".bashrc",
        ],
        extensions: &[],
        recursive: true,
        description: "Hidden and sensitive files",
    },
];
