#![allow(dead_code)]

use rusqlite::{params, Connection};
use std::path::Path;

/// Minimal copy of the Bear schema: notes, tags and the join table.
pub struct BearDb {
    conn: Connection,
    next_tag: i64,
}

impl BearDb {
    pub fn create(path: &Path) -> Self {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE ZSFNOTE (
                Z_PK INTEGER PRIMARY KEY,
                ZUNIQUEIDENTIFIER TEXT,
                ZTITLE TEXT,
                ZTEXT TEXT,
                ZTRASHED INTEGER DEFAULT 0
            );
            CREATE TABLE ZSFNOTETAG (Z_PK INTEGER PRIMARY KEY, ZTITLE TEXT);
            CREATE TABLE Z_7TAGS (Z_7NOTES INTEGER, Z_14TAGS INTEGER);",
        )
        .unwrap();
        Self { conn, next_tag: 1 }
    }

    pub fn tag(&mut self, title: &str) -> i64 {
        let pk = self.next_tag;
        self.next_tag += 1;
        self.conn
            .execute(
                "INSERT INTO ZSFNOTETAG (Z_PK, ZTITLE) VALUES (?1, ?2)",
                params![pk, title],
            )
            .unwrap();
        pk
    }

    pub fn note(&self, pk: i64, key: &str, title: &str, text: &str, tags: &[i64]) {
        self.conn
            .execute(
                "INSERT INTO ZSFNOTE (Z_PK, ZUNIQUEIDENTIFIER, ZTITLE, ZTEXT)
                 VALUES (?1, ?2, ?3, ?4)",
                params![pk, key, title, text],
            )
            .unwrap();
        for tag in tags {
            self.conn
                .execute(
                    "INSERT INTO Z_7TAGS (Z_7NOTES, Z_14TAGS) VALUES (?1, ?2)",
                    params![pk, tag],
                )
                .unwrap();
        }
    }

    pub fn edit(&self, key: &str, text: &str) {
        self.conn
            .execute(
                "UPDATE ZSFNOTE SET ZTEXT = ?2 WHERE ZUNIQUEIDENTIFIER = ?1",
                params![key, text],
            )
            .unwrap();
    }

    pub fn trash(&self, key: &str) {
        self.conn
            .execute(
                "UPDATE ZSFNOTE SET ZTRASHED = 1 WHERE ZUNIQUEIDENTIFIER = ?1",
                params![key],
            )
            .unwrap();
    }
}
