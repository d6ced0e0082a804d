pub mod mediawiki;
