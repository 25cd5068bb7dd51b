// crates/nlu/src/corpus.rs

//! Labelled phrases the statistical classifier is trained on. Fixed at build
//! time and never updated while the assistant runs.

use aari_core::Intent;

const SEND_MESSAGE: &[&str] = &[
    "send message", "send text", "send email", "send sms", "tell john", "message someone",
    "text someone", "email someone", "whatsapp someone", "send whatsapp", "send to john",
    "message to john", "text to john", "send message to mom", "send text to dad",
    "email my boss", "send whatsapp to my friend", "text my girlfriend", "message my wife",
    "message my family", "email my company", "send a message", "send an email", "send a text",
    "send a whatsapp", "send an sms", "tell them hello", "tell them i love them",
    "message them", "send my regards", "send my love", "send greetings", "get in touch",
    "reach out to", "contact", "write to", "drop a message", "drop a line", "ping someone",
    "hit someone up", "let someone know", "inform them", "notify them", "tell them that",
    "say hello to", "give my number to", "share with", "forward to", "send to whatsapp",
    "whatsapp message", "text msg", "instant message", "send via whatsapp", "whatsapp john",
    "text john", "email john", "send word to", "relay message", "convey message",
    "send communication", "message avnish", "message my brother", "message my sister",
    "send facebook message", "send telegram message", "send signal message",
    "contact john on whatsapp", "reach john via text", "email john at work",
    "send urgent message", "send quick message", "send important message", "tell avnish",
    "inform avnish", "notify avnish", "send now", "send immediately", "send asap",
    "send right away",
];

const MAKE_CALL: &[&str] = &[
    "call john", "make a call", "phone call", "ring someone", "call mom", "call dad",
    "call my friend", "call my family", "call my boss", "call the office", "call the police",
    "dial someone", "ring someone up", "give someone a call", "call me later", "call you back",
    "call again", "call once more", "phone someone", "telephone someone", "reach someone",
    "call home", "call office", "call hospital", "call emergency", "make a phone call",
    "place a call", "initiate a call", "call customer service", "call support",
    "call help desk", "call back", "return the call", "call him back", "conference call",
    "group call", "video call", "voice call", "ring up", "phone up", "get on the phone",
    "call on the phone", "call avnish", "call my brother", "call my sister", "dial john",
    "dial my number", "dial his number", "make a phone call to", "ring someone's number",
    "call their number", "call right now", "call immediately", "call asap", "call urgently",
    "want to call", "need to call", "should call", "must call", "call for help",
    "call for backup", "call for assistance", "facetime call", "whatsapp call",
    "video call on whatsapp",
];

const SET_REMINDER: &[&str] = &[
    "remind me", "set reminder", "remember to", "alert me", "remind me tomorrow",
    "remind me later", "remind me at 5", "set alarm", "set notification", "notify me",
    "alert me later", "don't forget", "make a note", "take a note", "note this down",
    "remind me about", "remind me on", "remind me in", "set a reminder for",
    "create a reminder", "add a reminder", "schedule reminder", "schedule notification",
    "schedule alert", "remember this", "keep in mind", "mark this", "flag this", "todo",
    "to do", "tasks", "task list", "checklist", "wake me up", "alarm clock", "snooze",
    "remind me to call", "remind me to buy", "remind me to check", "later", "after a while",
    "in an hour", "in 10 minutes", "set alarm for", "set alarm at", "alarm at 5am",
    "alarm tomorrow morning", "alarm today", "alarm tonight", "i need a reminder",
    "create an alert", "remind me tomorrow morning", "remind me tomorrow evening",
    "remind me in 5 minutes", "remind me in 10 minutes", "ask me about", "tell me to",
    "prompt me to", "remember me to", "don't let me forget", "make sure i remember", "set task",
    "add task", "create task", "new task",
];

const PLAY_MEDIA: &[&str] = &[
    "play music", "play song", "play video", "music please", "play album", "play artist",
    "play playlist", "play podcast", "play movie", "play film", "play show", "play series",
    "play next", "play previous", "play again", "replay", "start playing", "begin playback",
    "resume playback", "pause music", "stop music", "mute music", "lower volume",
    "increase volume", "turn up", "turn down", "shuffle", "repeat", "loop", "skip", "go back",
    "rewind", "fast forward", "play from beginning", "play from start", "restart song",
    "play my favorites", "play my library", "play recommended", "play something good",
    "play something new", "play something random", "put on music", "start music", "let's dance",
    "let's rock", "play sound", "play audio", "play content", "play stream",
    "start playing music", "begin playing", "resume playing", "play my playlist",
    "play music playlist", "play song playlist", "play podcast episode", "play audiobook",
    "play audio file", "play youtube video", "play movie online", "play film online",
    "continue playing", "play next song", "skip to next", "go to previous song",
    "previous track", "last song", "shuffle songs", "shuffle playlist", "random play",
];

const DOWNLOAD_FILE: &[&str] = &[
    "download file", "get file", "fetch document", "retrieve data", "download document",
    "download pdf", "download image", "download video", "download music", "download song",
    "download movie", "download app", "download software", "download installer",
    "download setup", "download data", "download report", "download spreadsheet",
    "download excel", "download word document", "download presentation", "download text file",
    "save file", "save document", "save to disk", "save locally", "get a copy", "make a copy",
    "backup file", "copy file", "grab file", "pull file", "grab document", "pull data",
    "download it", "get it", "fetch it", "retrieve it", "download from internet",
    "download from web", "download online", "download this", "download that",
    "download everything", "fetch file", "retrieve document", "grab information",
    "save this file", "download this file", "get this file", "download zip", "download rar",
    "download compressed file", "download the latest", "download newest", "download recent",
    "download to desktop", "download to downloads", "download folder", "get documents",
    "get media", "get resources", "get files", "download statement", "download invoice",
];

const SYSTEM_CONTROL: &[&str] = &[
    "open file manager", "open settings", "open chrome", "open notepad", "launch app",
    "start program", "windows settings", "open calculator", "open explorer",
    "open system settings", "open control panel", "turn on", "turn off", "shut down", "restart",
    "sleep", "open chatgpt", "open google", "open youtube", "open facebook", "open email",
    "open gmail", "open outlook", "open teams", "adjust brightness", "adjust volume", "mute",
    "unmute", "lock screen", "lock computer", "unlock", "logout", "open terminal",
    "open powershell", "open command prompt", "open taskbar", "open start menu", "minimize",
    "maximize", "full screen", "exit fullscreen", "close window", "open applications",
    "open programs", "open apps", "display settings", "network settings", "sound settings",
    "open wifi", "open bluetooth", "enable wifi", "disable wifi", "launch whatsapp",
    "launch telegram", "launch browser", "start firefox", "start chrome", "start edge",
    "start safari", "open visual studio", "open notepad++", "open vscode", "open file explorer",
    "open my files", "open documents", "turn on bluetooth", "turn off bluetooth",
    "enable bluetooth", "lower brightness", "increase brightness", "dim screen", "volume up",
    "volume down", "max volume", "mute volume", "restart computer", "shutdown computer",
    "put to sleep", "lock device", "unlock device", "log out", "sign out",
];

const QUERY: &[&str] = &[
    "what is", "when is", "where is", "how to", "search for", "tell me about", "what does",
    "what time", "what day", "who is", "why is", "which one", "how many", "how much",
    "what's happening", "what's the weather", "what's the time", "tell me more", "explain",
    "describe", "elaborate", "search the web", "search online", "google it", "find information",
    "look up", "find out", "check on", "what about", "any news", "latest news", "breaking news",
    "recent news", "how does it work", "what happens", "what comes next", "what if",
    "what then", "what else", "anything else", "facts about", "information about",
    "details about", "can you tell me", "do you know", "have you heard", "what do you think",
    "what's your opinion", "what do you say", "search for information", "look for details",
    "find facts", "what is the capital", "what is the weather today", "how is the weather",
    "what is the temperature", "what time is it", "what day is it", "what's the date",
    "tell me a joke", "tell me a story", "tell me facts", "explain how", "show me how",
    "teach me how", "latest update", "recent changes", "new information", "news today",
    "today's news", "current events",
];

const MEMORY: &[&str] = &[
    "remember this", "store this", "learn this", "save this", "remember my", "remember that",
    "remember when", "remember where", "keep in memory", "recall", "bring back", "think of",
    "what did i say", "what did we talk about", "remind me what", "did i tell you",
    "do you remember", "remember i said", "remember i asked", "remember i want",
    "remember i need", "save for later", "bookmark this", "mark important", "flag",
    "learn new fact", "add to knowledge", "update memory", "important information",
    "important note", "important contact", "store information", "file this", "catalog this",
    "organize this", "don't forget i said", "important thing", "i will remember", "memorize",
    "commit to memory", "engrave in memory", "recall later", "retrieve information", "look up",
    "historical note", "memory lane", "way back when", "save my preference",
    "remember my preference", "store my choice", "remember my name", "remember my number",
    "remember my address", "store this in memory", "add to memory", "save to memory",
    "my favorite", "i like", "i prefer", "my choice", "bookmark", "favorite",
    "mark as important",
];

const GREETING: &[&str] = &[
    "hello", "hi", "hey", "good morning", "good afternoon", "good evening", "good night",
    "hello there", "hi there", "hey there", "what's up", "how are you", "how are you doing",
    "how's it going", "how do you do", "nice to meet you", "pleased to meet you", "greetings",
    "welcome", "hey aari", "hello aari", "hi aari", "suno aari", "aari hello",
    "good to see you", "good to hear from you", "long time no see", "it's been a while",
    "haven't seen you in a while", "how have you been", "what's new", "what's happening",
    "what have you been up to", "how's life", "how's everything", "how's things",
    "how are things", "yo", "sup", "what's good", "what's going on", "yo yo yo",
    "hello my friend", "hi buddy", "hey buddy", "hello buddy", "morning", "afternoon",
    "evening", "night", "good day", "greetings friend", "nice day", "have a nice day", "cheers",
    "good to see you again", "welcome back", "great to see you", "how's your day",
    "hey how's it", "sup buddy", "yo what's up", "hi how are you", "hello my dear",
    "hi sweetheart", "hey love", "greetings to you", "nice seeing you", "it's nice to meet you",
    "pleasure to meet", "start", "begin", "activate", "wake up", "good morning sunshine",
    "hey there friend", "hello again", "hi again", "welcome again", "top of the morning",
    "how's the day treating you", "everything good", "you good", "all good", "doing well",
    "how you doing", "what up homie",
];

/// Training phrases grouped by intent, in keyword-table order.
pub const TRAINING_CORPUS: &[(Intent, &[&str])] = &[
    (Intent::SendMessage, SEND_MESSAGE),
    (Intent::MakeCall, MAKE_CALL),
    (Intent::SetReminder, SET_REMINDER),
    (Intent::PlayMedia, PLAY_MEDIA),
    (Intent::DownloadFile, DOWNLOAD_FILE),
    (Intent::SystemControl, SYSTEM_CONTROL),
    (Intent::Query, QUERY),
    (Intent::Memory, MEMORY),
    (Intent::Greeting, GREETING),
];

/// Flattens the corpus into parallel text/label vectors.
pub fn training_samples() -> (Vec<&'static str>, Vec<Intent>) {
    let mut texts = Vec::new();
    let mut labels = Vec::new();
    for (intent, phrases) in TRAINING_CORPUS {
        for phrase in phrases.iter() {
            texts.push(*phrase);
            labels.push(*intent);
        }
    }
    (texts, labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_every_classifiable_intent() {
        for intent in Intent::CLASSIFIABLE {
            let phrases = TRAINING_CORPUS
                .iter()
                .find(|(i, _)| *i == intent)
                .map(|(_, p)| p.len())
                .unwrap_or(0);
            assert!(phrases >= 50, "{} has only {} phrases", intent, phrases);
        }
    }

    #[test]
    fn samples_are_lowercase() {
        let (texts, labels) = training_samples();
        assert_eq!(texts.len(), labels.len());
        assert!(texts.iter().all(|t| t.to_lowercase() == *t));
    }
}
