// ---------------- drop ----------------

pub const STAGING_EVENTS_DROP: &str = "DROP TABLE IF EXISTS staging_events CASCADE";
pub const STAGING_SONGS_DROP: &str = "DROP TABLE IF EXISTS staging_songs CASCADE";
pub const SONGPLAYS_DROP: &str = "DROP TABLE IF EXISTS songplays CASCADE";
pub const USERS_DROP: &str = "DROP TABLE IF EXISTS users CASCADE";
pub const SONGS_DROP: &str = "DROP TABLE IF EXISTS songs CASCADE";
pub const ARTISTS_DROP: &str = "DROP TABLE IF EXISTS artists CASCADE";
pub const TIME_DROP: &str = "DROP TABLE IF EXISTS time CASCADE";

// ---------------- create ----------------

pub const STAGING_EVENTS_CREATE: &str = "
    CREATE TABLE IF NOT EXISTS staging_events(
        artist VARCHAR(150),
        auth VARCHAR(15),
        first_name VARCHAR(100),
        gender VARCHAR(1),
        item_in_session INT NOT NULL,
        last_name VARCHAR(100),
        length FLOAT,
        level VARCHAR(10),
        location VARCHAR(100),
        method VARCHAR(5),
        page VARCHAR(50),
        registration BIGINT,
        session_id INT,
        song VARCHAR(250),
        status INT,
        ts BIGINT,
        user_agent TEXT,
        user_id INT
    );
";

pub const STAGING_SONGS_CREATE: &str = "
    CREATE TABLE IF NOT EXISTS staging_songs(
        num_songs INT,
        artist_id TEXT NOT NULL,
        artist_latitude TEXT,
        artist_longitude TEXT,
        artist_location TEXT,
        artist_name TEXT NOT NULL,
        song_id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        duration FLOAT,
        year INT
    );
";

pub const SONGPLAYS_CREATE: &str = "
    CREATE TABLE IF NOT EXISTS songplays(
        songplay_id INT IDENTITY(0,1),
        start_time BIGINT NOT NULL,
        user_id INT NOT NULL,
        level TEXT,
        song_id TEXT,
        artist_id TEXT,
        session_id INT NOT NULL,
        location TEXT,
        user_agent TEXT
    );
";

pub const USERS_CREATE: &str = "
    CREATE TABLE IF NOT EXISTS users(
        user_id INT,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        gender VARCHAR(1),
        level TEXT
    );
";

pub const SONGS_CREATE: &str = "
    CREATE TABLE IF NOT EXISTS songs(
        song_id TEXT,
        title TEXT NOT NULL,
        artist_id TEXT NOT NULL,
        year INT,
        duration NUMERIC
    );
";

pub const ARTISTS_CREATE: &str = "
    CREATE TABLE IF NOT EXISTS artists(
        artist_id TEXT,
        name TEXT NOT NULL,
        location TEXT,
        latitude TEXT,
        longitude TEXT
    );
";

pub const TIME_CREATE: &str = "
    CREATE TABLE IF NOT EXISTS time(
        start_time TIMESTAMP,
        hour INT,
        day INT,
        week INT,
        month INT,
        year INT,
        weekday INT
    );
";

// ---------------- transform ----------------

// Joins staging_events twice; rows multiply when several events share a
// song title and artist name.
pub const SONGPLAYS_INSERT: &str = "
    INSERT INTO songplays (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
    SELECT se.ts AS start_time,
            se.user_id AS user_id,
            se.level AS level,
            ss.song_id AS song_id,
            ss.artist_id AS artist_id,
            se.session_id AS session_id,
            se.location AS location,
            se.user_agent AS user_agent
    FROM staging_songs AS ss
    INNER JOIN staging_events AS se ON ss.title = se.song
    INNER JOIN staging_events AS se2 ON se2.artist = ss.artist_name;
";

pub const USERS_INSERT: &str = "
    INSERT INTO users (user_id, first_name, last_name, gender, level)
    SELECT se.user_id,
           se.first_name,
           se.last_name,
           se.gender,
           se.level
    FROM staging_events AS se
    WHERE se.first_name IS NOT NULL;
";

pub const SONGS_INSERT: &str = "
    INSERT INTO songs (song_id, title, artist_id, year, duration)
    SELECT song_id, title, artist_id, year, duration
    FROM staging_songs;
";

pub const ARTISTS_INSERT: &str = "
    INSERT INTO artists (artist_id, name, location, latitude, longitude)
    SELECT artist_id,
            artist_name AS name,
            artist_location AS location,
            artist_latitude AS latitude,
            artist_longitude AS longitude
    FROM staging_songs;
";

// `ts` is epoch milliseconds.
pub const TIME_INSERT: &str = "
    INSERT INTO time (start_time, hour, day, week, month, year, weekday)
    SELECT (timestamp 'epoch' + ts * interval '1 second'/1000) AS start_time,
            date_part(hour, start_time) AS hour,
            date_part(day, start_time) AS day,
            date_part(week, start_time) AS week,
            date_part(month, start_time) AS month,
            date_part(year, start_time) AS year,
            date_part(weekday, start_time) AS weekday
    FROM staging_events
";

// ---------------- deduplicate ----------------

pub const TEMP_USERS_CREATE: &str = "
    CREATE TABLE IF NOT EXISTS temp_users(
        user_id INT,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        gender VARCHAR(1),
        level TEXT
    );
";

pub const TEMP_ARTISTS_CREATE: &str = "
    CREATE TABLE IF NOT EXISTS temp_artists(
        artist_id TEXT,
        name TEXT NOT NULL,
        location TEXT,
        latitude TEXT,
        longitude TEXT
    );
";

// One row per key. A user whose level changed keeps 'paid' over 'free'.
pub const TEMP_USERS_LOAD: &str = "
    INSERT INTO temp_users
        SELECT user_id, MAX(first_name), MAX(last_name), MAX(gender), MAX(level)
        FROM users
        GROUP BY user_id;
";

pub const TEMP_ARTISTS_LOAD: &str = "
    INSERT INTO temp_artists
        SELECT artist_id, MAX(name), MAX(location), MAX(latitude), MAX(longitude)
        FROM artists
        GROUP BY artist_id;
";

pub const TEMP_USERS_RENAME: &str = "ALTER TABLE temp_users RENAME TO users";
pub const TEMP_ARTISTS_RENAME: &str = "ALTER TABLE temp_artists RENAME TO artists";
